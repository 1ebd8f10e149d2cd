//!
//! # DEF Reading
//!

// Std-Lib
use std::path::Path;

// Crates.io
use log::{debug, warn};

// Local Imports
use super::DefKey;
use crate::db::{Block, ITerm, Instance, Int, Net, Orient, PlacementStatus, Point, Rect};
use crate::error::{PadResult, PadframeError};
use crate::utils::lex::{line_content, Lexer, Token, TokenType};
use crate::utils::{EnumStr, ErrorContext, ErrorHelper};

/// Sections skipped wholesale, each closed by `END <section>`
const SKIPPED_SECTIONS: [&str; 12] = [
    "PROPERTYDEFINITIONS",
    "VIAS",
    "STYLES",
    "NONDEFAULTRULES",
    "REGIONS",
    "PINS",
    "PINPROPERTIES",
    "BLOCKAGES",
    "SLOTS",
    "FILLS",
    "SCANCHAINS",
    "GROUPS",
];

/// Read the [Block] in DEF file `fname`
pub fn parse_file(fname: impl AsRef<Path>) -> PadResult<Block> {
    let src = std::fs::read_to_string(fname)?;
    parse_str(&src)
}
/// Read a [Block] from DEF content `src`
pub fn parse_str(src: &str) -> PadResult<Block> {
    let mut parser = DefParser::new(src);
    parser.parse_design()
}

///
/// # DEF Parser
///
/// Transforms DEF text into a [Block].
/// Statements outside the modeled subset are skipped through their semicolon,
/// and the sections in [SKIPPED_SECTIONS] through their `END`.
///
pub struct DefParser<'src> {
    src: &'src str,
    lex: Lexer<'src>,
    /// Context Stack
    ctx: Vec<ErrorContext>,
}
impl<'src> DefParser<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            lex: Lexer::punctuated(src),
            ctx: Vec::new(),
        }
    }
    /// Parse the full source into a [Block]
    pub fn parse_design(&mut self) -> PadResult<Block> {
        let mut name = None;
        let mut block = Block::new("");
        while let Some(txt) = self.peek_txt() {
            self.advance();
            match DefKey::from_str(txt) {
                Some(DefKey::Design) => {
                    name = Some(self.parse_ident()?);
                    self.expect(TokenType::SemiColon)?;
                }
                Some(DefKey::Units) => {
                    self.expect_key(DefKey::Distance)?;
                    self.expect_key(DefKey::Microns)?;
                    block.dbu_per_micron = self.parse_dbu()?;
                    self.expect(TokenType::SemiColon)?;
                }
                Some(DefKey::DieArea) => block.die_area = Some(self.parse_die_area()?),
                Some(DefKey::Components) => block.insts = self.parse_components()?,
                Some(key @ (DefKey::SpecialNets | DefKey::Nets)) => {
                    self.parse_nets(key, &mut block.nets)?
                }
                Some(DefKey::End) => {
                    self.expect_key(DefKey::Design)?;
                    break;
                }
                _ if SKIPPED_SECTIONS.contains(&txt) => self.skip_section(txt)?,
                _ if txt == "BEGINEXT" => self.skip_through("ENDEXT")?,
                _ => {
                    debug!("Skipping DEF statement {}", txt);
                    self.skip_statement()?
                }
            }
        }
        block.name = self.unwrap(name, "missing DESIGN statement")?;
        Ok(block)
    }
    /// Parse the COMPONENTS section, after its keyword
    fn parse_components(&mut self) -> PadResult<Vec<Instance>> {
        self.ctx.push(ErrorContext::Section(DefKey::Components.to_str()));
        let count = self.parse_count()?;
        let mut insts = Vec::with_capacity(count);
        loop {
            match self.peek_txt() {
                Some("-") => {
                    self.advance();
                    insts.push(self.parse_component()?);
                }
                Some("END") => {
                    self.advance();
                    self.expect_key(DefKey::Components)?;
                    break;
                }
                _ => return self.fail("expected `-` or END"),
            }
        }
        if insts.len() != count {
            warn!("DEF declares {} components, but lists {}", count, insts.len());
        }
        self.ctx.pop();
        Ok(insts)
    }
    /// Parse a component, after its leading `-`
    fn parse_component(&mut self) -> PadResult<Instance> {
        let name = self.parse_ident()?;
        self.ctx.push(ErrorContext::Instance(name.clone()));
        let master = self.parse_ident()?;
        let mut inst = Instance::new(name, master);
        loop {
            match self.peek_txt() {
                Some(";") => {
                    self.advance();
                    break;
                }
                Some("+") => {
                    self.advance();
                    match self.peek_txt().and_then(DefKey::from_str) {
                        Some(key @ (DefKey::Placed | DefKey::Fixed | DefKey::Cover)) => {
                            self.advance();
                            let loc = self.parse_point()?;
                            let orient: Orient = self.parse_enum()?;
                            let status = match key {
                                DefKey::Placed => PlacementStatus::Placed,
                                _ => PlacementStatus::Fixed,
                            };
                            inst.place(loc, Some(orient), status);
                        }
                        Some(DefKey::Unplaced) => {
                            self.advance();
                            inst.status = PlacementStatus::Unplaced;
                        }
                        _ => self.skip_option()?,
                    }
                }
                _ => return self.fail("expected `+` or `;`"),
            }
        }
        self.ctx.pop();
        Ok(inst)
    }
    /// Parse a NETS or SPECIALNETS section, after its keyword, adding to `nets`.
    /// Nets listed in both sections are combined.
    fn parse_nets(&mut self, key: DefKey, nets: &mut Vec<Net>) -> PadResult<()> {
        self.ctx.push(ErrorContext::Section(key.to_str()));
        let special = key == DefKey::SpecialNets;
        self.parse_count()?;
        loop {
            match self.peek_txt() {
                Some("-") => {
                    self.advance();
                    let net = self.parse_net(special)?;
                    match nets.iter_mut().find(|n| n.name == net.name) {
                        Some(existing) => {
                            existing.special |= net.special;
                            for iterm in net.iterms {
                                let dup = existing
                                    .iterms
                                    .iter()
                                    .any(|t| t.inst == iterm.inst && t.pin == iterm.pin);
                                if !dup {
                                    existing.iterms.push(iterm);
                                }
                            }
                        }
                        None => nets.push(net),
                    }
                }
                Some("END") => {
                    self.advance();
                    self.expect_key(key)?;
                    break;
                }
                _ => return self.fail("expected `-` or END"),
            }
        }
        self.ctx.pop();
        Ok(())
    }
    /// Parse a net, after its leading `-`.
    /// Connections to I/O pins, and wildcard connections, are skipped.
    fn parse_net(&mut self, special: bool) -> PadResult<Net> {
        let name = self.parse_ident()?;
        self.ctx.push(ErrorContext::Net(name.clone()));
        let mut iterms = Vec::new();
        while self.matches(TokenType::LeftParen) {
            self.advance();
            let inst = self.parse_ident()?;
            let pin = self.parse_ident()?;
            // Connection options, e.g. `+ SYNTHESIZED`
            while !self.matches(TokenType::RightParen) {
                self.next_or_fail("unterminated connection")?;
            }
            self.advance();
            if inst == "*" || inst == DefKey::Pin.to_str() {
                continue;
            }
            iterms.push(ITerm { inst, pin, special });
        }
        // Net options, routing included, run through the semicolon
        self.skip_statement()?;
        self.ctx.pop();
        Ok(Net {
            name,
            special,
            iterms,
        })
    }
    /// Parse the DIEAREA points through the semicolon, into their bounding box
    fn parse_die_area(&mut self) -> PadResult<Rect> {
        let mut pts = Vec::new();
        while self.matches(TokenType::LeftParen) {
            pts.push(self.parse_point()?);
        }
        self.expect(TokenType::SemiColon)?;
        self.assert(pts.len() >= 2, "DIEAREA requires at least two points")?;
        let xs = pts.iter().map(|p| p.x);
        let ys = pts.iter().map(|p| p.y);
        Ok(Rect {
            p0: Point::new(xs.clone().min().unwrap_or(0), ys.clone().min().unwrap_or(0)),
            p1: Point::new(xs.max().unwrap_or(0), ys.max().unwrap_or(0)),
        })
    }
    /// Parse a section's item count and its semicolon
    fn parse_count(&mut self) -> PadResult<usize> {
        let count = self.parse_number()?;
        self.expect(TokenType::SemiColon)?;
        match usize::try_from(count) {
            Ok(c) => Ok(c),
            Err(_) => self.fail(format!("invalid count {}", count)),
        }
    }
    /// Parse a `( x y )` point
    fn parse_point(&mut self) -> PadResult<Point> {
        self.expect(TokenType::LeftParen)?;
        let x = self.parse_number()?;
        let y = self.parse_number()?;
        self.expect(TokenType::RightParen)?;
        Ok(Point::new(x, y))
    }
    /// Parse the database units per micron
    fn parse_dbu(&mut self) -> PadResult<u32> {
        let dbu = self.parse_number()?;
        match u32::try_from(dbu) {
            Ok(d) if d > 0 => Ok(d),
            _ => self.fail(format!("invalid DISTANCE MICRONS {}", dbu)),
        }
    }
    /// Skip tokens through the next semicolon
    fn skip_statement(&mut self) -> PadResult<()> {
        while !self.matches(TokenType::SemiColon) {
            self.next_or_fail("expected `;`")?;
        }
        self.advance();
        Ok(())
    }
    /// Skip a `+` option's arguments, up to the next `+` or `;`
    fn skip_option(&mut self) -> PadResult<()> {
        while !matches!(self.peek_txt(), Some("+") | Some(";")) {
            self.next_or_fail("expected `+` or `;`")?;
        }
        Ok(())
    }
    /// Skip tokens through `END <section>`
    fn skip_section(&mut self, section: &str) -> PadResult<()> {
        debug!("Skipping DEF section {}", section);
        loop {
            let tok = self.next_or_fail(format!("unterminated {} section", section))?;
            if self.txt(&tok) == DefKey::End.to_str() && self.peek_txt() == Some(section) {
                self.advance();
                return Ok(());
            }
        }
    }
    /// Skip tokens through word `word`
    fn skip_through(&mut self, word: &str) -> PadResult<()> {
        loop {
            let tok = self.next_or_fail(format!("expected {}", word))?;
            if self.txt(&tok) == word {
                return Ok(());
            }
        }
    }
    /// Text of the next [Token], without advancing
    fn peek_txt(&self) -> Option<&'src str> {
        let src = self.src;
        self.lex.peek_token().map(|t| t.substr(src))
    }
    /// Advance by a [Token] without returning it
    fn advance(&mut self) {
        self.lex.next_token();
    }
    /// Get the next [Token], failing with `msg` at end of input
    fn next_or_fail(&mut self, msg: impl Into<String>) -> PadResult<Token> {
        match self.lex.next_token() {
            Some(t) => Ok(t),
            None => self.fail(msg),
        }
    }
    /// Boolean indication of whether our next [Token] is of [TokenType] `ttype`
    fn matches(&self, ttype: TokenType) -> bool {
        matches!(self.lex.peek_token(), Some(t) if t.ttype == ttype)
    }
    /// Assert the next [Token] is of [TokenType] `ttype`, and return it
    fn expect(&mut self, ttype: TokenType) -> PadResult<Token> {
        if !self.matches(ttype) {
            return self.fail(format!("expected {:?}", ttype));
        }
        self.next_or_fail(format!("expected {:?}", ttype))
    }
    /// Assert the next [Token] is keyword `key`
    fn expect_key(&mut self, key: DefKey) -> PadResult<()> {
        if self.peek_txt() != Some(key.to_str()) {
            return self.fail(format!("expected {}", key));
        }
        self.advance();
        Ok(())
    }
    fn txt(&self, tok: &Token) -> &'src str {
        tok.substr(self.src)
    }
    /// Parse a name. Names may be all digits.
    fn parse_ident(&mut self) -> PadResult<String> {
        match self.lex.peek_token() {
            Some(t) if matches!(t.ttype, TokenType::Name | TokenType::Number) => {
                let txt = self.txt(t).to_string();
                self.advance();
                Ok(txt)
            }
            _ => self.fail("expected a name"),
        }
    }
    /// Parse an integer
    fn parse_number(&mut self) -> PadResult<Int> {
        let tok = self.expect(TokenType::Number)?;
        let txt = self.txt(&tok);
        txt.parse()
            .map_err(|_| self.err(format!("invalid integer {}", txt)))
    }
    /// Parse an enumerated keyword of type `T`
    fn parse_enum<T: EnumStr>(&mut self) -> PadResult<T> {
        match self.peek_txt().and_then(T::from_str) {
            Some(t) => {
                self.advance();
                Ok(t)
            }
            None => self.fail(format!("expected one of {}", T::expected())),
        }
    }
}
impl ErrorHelper for DefParser<'_> {
    /// Create a [PadframeError::DefParse] at the next token
    fn err(&self, msg: impl Into<String>) -> PadframeError {
        let (line, token) = match self.lex.peek_token() {
            Some(t) => (t.loc.line, self.txt(t)),
            None => (self.lex.line(), "EOF"),
        };
        PadframeError::DefParse {
            message: format!("{}, found `{}`", msg.into(), token),
            line,
            content: line_content(self.src, line),
            stack: self.ctx.clone(),
        }
    }
}
