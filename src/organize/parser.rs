//! Recursive-descent parser from a token stream to a use tree.
//!
//! The parser is rebased onto an absolute document position so every emitted
//! segment range points into the original source, not the scanned substring.
//! Any mismatch raises a [`ParseError`]; the scanner drops that one statement
//! and keeps going.

use thiserror::Error;

use super::{
	lexer::{self, Token, TokenKind},
	shared::{Position, Range},
	tree::{Segment, UseStatement, UseTree},
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum ParseError {
	#[error("unexpected end of use declaration")]
	UnexpectedEnd,
	#[error("unexpected `{found}` at {line}:{column}")]
	UnexpectedToken { found: String, line: usize, column: usize },
}

pub(crate) fn parse_statement(
	text: &str,
	attributes: Vec<String>,
	range: Range,
) -> Result<UseStatement, ParseError> {
	let mut parser = Parser { tokens: lexer::lex(text), pos: 0, base: range.start };
	let visibility = parser.parse_visibility()?;

	parser.expect(TokenKind::Use)?;

	let tree = parser.parse_use_tree()?;

	parser.expect(TokenKind::Semi)?;

	Ok(UseStatement { visibility, tree, attributes, range, block_id: None })
}

struct Parser {
	tokens: Vec<Token>,
	pos: usize,
	base: Position,
}
impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	fn bump(&mut self) -> Result<Token, ParseError> {
		let token = self.tokens.get(self.pos).cloned().ok_or(ParseError::UnexpectedEnd)?;

		self.pos += 1;

		Ok(token)
	}

	fn at(&self, kind: TokenKind) -> bool {
		self.peek().is_some_and(|token| token.kind == kind)
	}

	fn eat(&mut self, kind: TokenKind) -> Option<Token> {
		if self.at(kind) { self.bump().ok() } else { None }
	}

	fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
		let token = self.bump()?;

		if token.kind == kind { Ok(token) } else { Err(self.unexpected(&token)) }
	}

	fn unexpected(&self, token: &Token) -> ParseError {
		let range = self.absolute(token);

		ParseError::UnexpectedToken {
			found: token.text.clone(),
			line: range.start.line,
			column: range.start.column,
		}
	}

	// Token positions are relative to the scanned substring; only the first
	// line shares the base column origin.
	fn absolute(&self, token: &Token) -> Range {
		let line = self.base.line + token.line;
		let shift = if token.line == 0 { self.base.column } else { 0 };

		Range::new(
			Position::new(line, shift + token.start),
			Position::new(line, shift + token.end),
		)
	}

	fn parse_visibility(&mut self) -> Result<Option<String>, ParseError> {
		if self.eat(TokenKind::Pub).is_none() {
			return Ok(None);
		}
		if self.eat(TokenKind::OpenParen).is_none() {
			return Ok(Some("pub".to_owned()));
		}

		let inner = if self.eat(TokenKind::In).is_some() {
			format!("in {}", self.parse_plain_path()?)
		} else {
			self.segment_token()?.text
		};

		self.expect(TokenKind::CloseParen)?;

		Ok(Some(format!("pub({inner})")))
	}

	fn parse_plain_path(&mut self) -> Result<String, ParseError> {
		let mut path = self.segment_token()?.text;

		while self.eat(TokenKind::PathSep).is_some() {
			path.push_str("::");
			path.push_str(&self.segment_token()?.text);
		}

		Ok(path)
	}

	fn segment_token(&mut self) -> Result<Token, ParseError> {
		let token = self.bump()?;

		match token.kind {
			TokenKind::Ident | TokenKind::SelfKw | TokenKind::Crate | TokenKind::Super => Ok(token),
			_ => Err(self.unexpected(&token)),
		}
	}

	fn parse_segment(&mut self) -> Result<Segment, ParseError> {
		let token = self.segment_token()?;
		let range = self.absolute(&token);
		let alias = self.parse_alias()?;

		Ok(Segment { name: token.text, alias, range: Some(range) })
	}

	fn parse_alias(&mut self) -> Result<Option<String>, ParseError> {
		if self.eat(TokenKind::As).is_none() {
			return Ok(None);
		}

		Ok(Some(self.expect(TokenKind::Ident)?.text))
	}

	fn parse_use_tree(&mut self) -> Result<UseTree, ParseError> {
		if let Some(token) = self.eat(TokenKind::Star) {
			let mut tree = UseTree::glob();

			tree.segment.range = Some(self.absolute(&token));

			return Ok(tree);
		}
		if self.at(TokenKind::SelfKw) {
			let token = self.bump()?;
			let range = self.absolute(&token);
			let alias = self.parse_alias()?;

			return Ok(UseTree::leaf(Segment { name: token.text, alias, range: Some(range) }));
		}

		let segment = self.parse_segment()?;

		if self.eat(TokenKind::PathSep).is_none() {
			return Ok(UseTree::leaf(segment));
		}

		let children = if self.eat(TokenKind::OpenBrace).is_some() {
			self.parse_use_tree_list()?
		} else if let Some(token) = self.eat(TokenKind::Star) {
			let mut glob = UseTree::glob();

			glob.segment.range = Some(self.absolute(&token));

			vec![glob]
		} else {
			vec![self.parse_use_tree()?]
		};

		Ok(UseTree { segment, children: Some(children), is_glob: false })
	}

	fn parse_use_tree_list(&mut self) -> Result<Vec<UseTree>, ParseError> {
		let mut trees = Vec::new();

		loop {
			trees.push(self.parse_use_tree()?);

			if self.eat(TokenKind::Comma).is_some() {
				if self.eat(TokenKind::CloseBrace).is_some() {
					break;
				}

				continue;
			}

			self.expect(TokenKind::CloseBrace)?;

			break;
		}

		Ok(trees)
	}
}
