//! Lexer and command grammar for the subset of XDC that shapes pblocks.

use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Word(String),
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semi,
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(x) = self.input[self.pos..].find(|x: char| !x.is_whitespace()) {
            self.pos += x;
        } else {
            self.pos = self.input.len();
        }
        let c = self.input[self.pos..].chars().next()?;
        let simple = match c {
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            ';' => Some(Token::Semi),
            _ => None,
        };
        if let Some(tok) = simple {
            self.pos += 1;
            return Some(tok);
        }
        match c {
            '#' => {
                self.pos = self.input.len();
                None
            }
            '"' => {
                self.pos += 1;
                let rest = &self.input[self.pos..];
                let end = rest.find('"').unwrap_or(rest.len());
                let word = rest[..end].to_string();
                self.pos = (self.pos + end + 1).min(self.input.len());
                Some(Token::Word(word))
            }
            _ => {
                let rest = &self.input[self.pos..];
                let end = rest
                    .find(|x: char| x.is_whitespace() || matches!(x, '[' | ']' | '{' | '}' | ';'))
                    .unwrap_or(rest.len());
                self.pos += end;
                Some(Token::Word(rest[..end].to_string()))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeEdit {
    Add(String),
    Remove(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    DefinePartition {
        name: String,
    },
    ResizePartition {
        name: String,
        edits: Vec<RangeEdit>,
    },
    /// `resize_pblock -from … -to …`, which moves sites between pblocks.
    MovePartition {
        name: String,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    ExpectedName,
    ExpectedRange,
    UnclosedBracket,
    UnclosedBrace,
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let desc = match self {
            SyntaxError::ExpectedName => "expected a pblock name",
            SyntaxError::ExpectedRange => "expected a range list",
            SyntaxError::UnclosedBracket => "unclosed `[`",
            SyntaxError::UnclosedBrace => "unclosed `{`",
        };
        write!(f, "{desc}")
    }
}

impl std::error::Error for SyntaxError {}

struct Parser<'t> {
    toks: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.toks.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let res = self.toks.get(self.pos);
        if res.is_some() {
            self.pos += 1;
        }
        res
    }

    fn words_until(&mut self, close: &Token, err: SyntaxError) -> Result<Vec<String>, SyntaxError> {
        let mut res = vec![];
        loop {
            match self.bump() {
                None => return Err(err),
                Some(t) if t == close => return Ok(res),
                Some(Token::Word(w)) => res.push(w.clone()),
                Some(_) => (),
            }
        }
    }

    /// A bare name, a `{name}`, or `[get_pblocks name]`.
    fn name(&mut self) -> Result<String, SyntaxError> {
        match self.bump() {
            Some(Token::Word(w)) => Ok(w.clone()),
            Some(Token::LBrace) => {
                let words = self.words_until(&Token::RBrace, SyntaxError::UnclosedBrace)?;
                words.into_iter().next().ok_or(SyntaxError::ExpectedName)
            }
            Some(Token::LBracket) => {
                let words = self.words_until(&Token::RBracket, SyntaxError::UnclosedBracket)?;
                words
                    .into_iter()
                    .skip_while(|w| w == "get_pblocks")
                    .find(|w| !w.starts_with('-'))
                    .ok_or(SyntaxError::ExpectedName)
            }
            _ => Err(SyntaxError::ExpectedName),
        }
    }

    fn range_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        match self.bump() {
            Some(Token::Word(w)) => Ok(vec![w.clone()]),
            Some(Token::LBrace) => self.words_until(&Token::RBrace, SyntaxError::UnclosedBrace),
            _ => Err(SyntaxError::ExpectedRange),
        }
    }

    fn resize(&mut self) -> Result<Command, SyntaxError> {
        let name = self.name()?;
        let mut edits = vec![];
        let mut is_move = false;
        while let Some(tok) = self.bump() {
            let Token::Word(opt) = tok else {
                continue;
            };
            match opt.as_str() {
                "-add" => edits.extend(self.range_list()?.into_iter().map(RangeEdit::Add)),
                "-remove" => edits.extend(self.range_list()?.into_iter().map(RangeEdit::Remove)),
                "-from" | "-to" => {
                    self.range_list()?;
                    is_move = true;
                }
                "-locs" => {
                    if let Some(Token::Word(_)) = self.peek() {
                        self.pos += 1;
                    }
                }
                _ => (),
            }
        }
        if is_move {
            Ok(Command::MovePartition { name })
        } else {
            Ok(Command::ResizePartition { name, edits })
        }
    }
}

/// Parses one command (the tokens between two `;`).
pub fn parse_command(toks: &[Token]) -> Result<Command, SyntaxError> {
    let mut parser = Parser { toks, pos: 0 };
    match parser.bump() {
        Some(Token::Word(w)) if w == "create_pblock" => Ok(Command::DefinePartition {
            name: parser.name()?,
        }),
        Some(Token::Word(w)) if w == "resize_pblock" => parser.resize(),
        _ => Ok(Command::Other),
    }
}

/// Splits a script line into commands and parses each of them.
pub fn parse_line(line: &str) -> Vec<Result<Command, SyntaxError>> {
    let toks: Vec<_> = Lexer::new(line).collect();
    toks.split(|t| *t == Token::Semi)
        .filter(|cmd| !cmd.is_empty())
        .map(parse_command)
        .collect()
}
