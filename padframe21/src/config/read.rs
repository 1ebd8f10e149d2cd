//!
//! # Padframe Config Reading
//!
//! Parser for the padframe config text format.
//! Statements are whitespace-separated words terminated by semicolons,
//! and may span lines. `#` starts a comment running to end-of-line.
//!

// Std-Lib
use std::path::Path;

// Local Imports
use super::{Area, ConfigKey, CornerEntry, CornerPos, PadConfig, Side, SideEntry};
use crate::db::Int;
use crate::error::{PadResult, PadframeError};
use crate::extract::PadInstance;
use crate::utils::lex::{line_content, Lexer, Token, TokenType};
use crate::utils::{EnumStr, ErrorHelper};

/// Parse config content from file `fname`
pub fn parse_file(fname: impl AsRef<Path>) -> PadResult<PadConfig> {
    let src = std::fs::read_to_string(fname)?;
    parse_str(&src)
}
/// Parse config content `src` from string
pub fn parse_str(src: &str) -> PadResult<PadConfig> {
    let mut parser = ConfigParser::new(src)?;
    parser.parse_config()
}

///
/// # Config Parser
///
/// Transforms input text into a [PadConfig].
/// Keywords are case-sensitive. Later `AREA` and `GRID` statements override earlier ones.
/// Each `SPACE` joins the side of the `PAD` before it.
///
pub struct ConfigParser<'src> {
    src: &'src str,
    lex: Lexer<'src>,
}
impl<'src> ConfigParser<'src> {
    pub fn new(src: &'src str) -> PadResult<Self> {
        Ok(Self {
            src,
            lex: Lexer::new(src),
        })
    }
    /// Parse the full source into a [PadConfig]
    pub fn parse_config(&mut self) -> PadResult<PadConfig> {
        let mut cfg = PadConfig::default();
        let mut last_side = None;
        while self.lex.peek_token().is_some() {
            match self.parse_key()? {
                ConfigKey::Area => {
                    let width = self.parse_number()?;
                    let height = self.parse_number()?;
                    cfg.area = Some(Area::new(width, height));
                }
                ConfigKey::Grid => cfg.grid = Some(self.parse_number()?),
                ConfigKey::Filler => cfg.fillers.push(self.parse_ident()?),
                ConfigKey::Corner => {
                    let name = self.parse_ident()?;
                    let pos: CornerPos = self.parse_enum()?;
                    let cell = self.parse_ident()?;
                    cfg.corners.push(CornerEntry {
                        pos,
                        pad: PadInstance::new(name, cell),
                    });
                }
                ConfigKey::Pad => {
                    let name = self.parse_ident()?;
                    let side: Side = self.parse_enum()?;
                    let cell = self.parse_ident()?;
                    cfg.sides.get_mut(side).push(PadInstance::new(name, cell).into());
                    last_side = Some(side);
                }
                ConfigKey::Space => {
                    let side = match last_side {
                        Some(side) => side,
                        None => return self.fail("SPACE must follow a PAD"),
                    };
                    let gap = self.parse_number()?;
                    if gap < 0 {
                        return self.fail(format!("negative SPACE {}", gap));
                    }
                    cfg.sides.get_mut(side).push(SideEntry::Space(gap));
                }
            }
            self.expect(TokenType::SemiColon)?;
        }
        Ok(cfg)
    }
    /// Assert the next [Token] is of [TokenType] `ttype`, and return it
    fn expect(&mut self, ttype: TokenType) -> PadResult<Token> {
        match self.lex.peek_token() {
            Some(t) if t.ttype == ttype => (),
            _ => return self.fail(format!("expected {:?}", ttype)),
        }
        match self.lex.next_token() {
            Some(t) => Ok(t),
            None => self.fail(format!("expected {:?}", ttype)),
        }
    }
    /// Retrieve the text-content of [Token] `tok`
    fn txt(&self, tok: &Token) -> &'src str {
        tok.substr(self.src)
    }
    /// Parse a statement keyword
    fn parse_key(&mut self) -> PadResult<ConfigKey> {
        self.parse_enum()
    }
    /// Parse an enumerated keyword of type `T`
    fn parse_enum<T: EnumStr>(&mut self) -> PadResult<T> {
        let tok = match self.lex.peek_token() {
            Some(t) if t.ttype == TokenType::Name => *t,
            _ => return self.fail(format!("expected one of {}", T::expected())),
        };
        match T::from_str(self.txt(&tok)) {
            Some(t) => {
                self.lex.next_token();
                Ok(t)
            }
            None => self.fail(format!("expected one of {}", T::expected())),
        }
    }
    /// Parse an instance or cell name. Names may be all digits.
    fn parse_ident(&mut self) -> PadResult<String> {
        let tok = match self.lex.peek_token() {
            Some(t) if matches!(t.ttype, TokenType::Name | TokenType::Number) => *t,
            _ => return self.fail("expected a name"),
        };
        self.lex.next_token();
        Ok(self.txt(&tok).to_string())
    }
    /// Parse an integer
    fn parse_number(&mut self) -> PadResult<Int> {
        let tok = self.expect(TokenType::Number)?;
        self.txt(&tok)
            .parse()
            .map_err(|_| self.err(format!("invalid integer {}", self.txt(&tok))))
    }
}
impl ErrorHelper for ConfigParser<'_> {
    /// Create a [PadframeError::ConfigParse] at the next token
    fn err(&self, msg: impl Into<String>) -> PadframeError {
        let (line, token) = match self.lex.peek_token() {
            Some(t) => (t.loc.line, self.txt(t)),
            None => (self.lex.line(), "EOF"),
        };
        PadframeError::ConfigParse {
            message: format!("{}, found `{}`", msg.into(), token),
            line,
            content: line_content(self.src, line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_statements() -> PadResult<()> {
        let src = r#"
        # Generated for `top`
        AREA 3000 2500 ;

        CORNER c_sw SW sky130_ef_io__corner_pad ;
        CORNER c_nw NW sky130_ef_io__corner_pad ;
        CORNER c_ne NE sky130_ef_io__corner_pad ;
        CORNER c_se SE sky130_ef_io__corner_pad ;

        PAD gpio[0] N sky130_ef_io__gpiov2_pad ;  # trailing comment
        PAD fill0 N
            sky130_ef_io__com_bus_slice_20um ;
        PAD vccd W sky130_ef_io__vccd_hvc_pad;
        GRID 1 ;
        FILLER sky130_ef_io__com_bus_slice ;
        "#;
        let cfg = parse_str(src)?;
        assert_eq!(cfg.area, Some(Area::new(3000, 2500)));
        assert_eq!(cfg.grid, Some(1));
        assert_eq!(cfg.fillers, vec!["sky130_ef_io__com_bus_slice".to_string()]);
        assert_eq!(cfg.corners.len(), 4);
        assert_eq!(cfg.corners[2].pos, CornerPos::Ne);
        assert_eq!(cfg.corners[2].pad.name, "c_ne");
        let north: Vec<_> = cfg.sides.pads(Side::N).collect();
        assert_eq!(north.len(), 2);
        assert_eq!(north[0], &PadInstance::new("gpio[0]", "sky130_ef_io__gpiov2_pad"));
        assert_eq!(north[1].cell, "sky130_ef_io__com_bus_slice_20um");
        assert_eq!(cfg.sides.pads(Side::W).next().map(|p| p.name.as_str()), Some("vccd"));
        assert!(cfg.sides.get(Side::E).is_empty());
        Ok(())
    }

    #[test]
    fn later_area_overrides() -> PadResult<()> {
        let cfg = parse_str("AREA 10 20 ;\nAREA 30 40 ;")?;
        assert_eq!(cfg.area, Some(Area::new(30, 40)));
        assert_eq!(parse_str("# nothing\n")?, PadConfig::default());
        Ok(())
    }

    #[test]
    fn reports_line_and_content() {
        let src = "AREA 10 20 ;\nPAD p0 X cell ;\n";
        match parse_str(src) {
            Err(PadframeError::ConfigParse {
                message,
                line,
                content,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "PAD p0 X cell ;");
                assert!(message.contains("N|E|S|W"), "{}", message);
                assert!(message.contains("`X`"), "{}", message);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_statements() {
        let bad = [
            "AREA 10 ;",
            "AREA ten 20 ;",
            "area 10 20 ;",
            "PAD p0 N cell",
            "CORNER c0 N cell ;",
            "OFFSET 10 ;",
            "SPACE 10 ;",
            "PAD p0 N cell ;\nSPACE -5 ;",
            "PAD p0 N cell ;\nSPACE wide ;",
        ];
        for src in bad {
            assert!(
                matches!(parse_str(src), Err(PadframeError::ConfigParse { .. })),
                "{}",
                src
            );
        }
    }

    #[test]
    fn spaces_follow_their_pads() -> PadResult<()> {
        let src = r#"
        PAD gpio0 N sky130_ef_io__gpiov2_pad ;
        SPACE 40 ;
        PAD gpio1 N sky130_ef_io__gpiov2_pad ;
        PAD vccd0 E sky130_ef_io__vccd_hvc_pad ;
        SPACE 12 ;
        SPACE 8 ;
        "#;
        let cfg = parse_str(src)?;
        assert_eq!(
            cfg.sides.get(Side::N),
            &[
                SideEntry::Pad(PadInstance::new("gpio0", "sky130_ef_io__gpiov2_pad")),
                SideEntry::Space(40),
                SideEntry::Pad(PadInstance::new("gpio1", "sky130_ef_io__gpiov2_pad")),
            ]
        );
        assert_eq!(
            cfg.sides.get(Side::E)[1..],
            [SideEntry::Space(12), SideEntry::Space(8)]
        );
        assert_eq!(cfg.sides.len(), 3);
        assert_eq!(cfg.entries().count(), 3);
        Ok(())
    }

    #[test]
    fn names_may_be_numbers() -> PadResult<()> {
        let cfg = parse_str("CORNER 7 SW sky130_ef_io__corner_pad ;\nPAD 123 N sky130_ef_io__gpiov2_pad ;")?;
        assert_eq!(cfg.corners[0].pad.name, "7");
        let pad = cfg.sides.pads(Side::N).next().map(|p| p.name.as_str());
        assert_eq!(pad, Some("123"));
        assert_eq!(parse_str(&cfg.to_string()?)?, cfg);
        Ok(())
    }
}
