//! Token scanner for a single use-declaration substring.
//!
//! Positions are relative to the scanned substring: newlines bump the line
//! counter and reset the column origin, so the parser can rebase tokens onto
//! absolute document positions. Unrecognized characters are skipped silently.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
	Use,
	Pub,
	As,
	SelfKw,
	Crate,
	Super,
	In,
	Ident,
	PathSep,
	OpenBrace,
	CloseBrace,
	Comma,
	Semi,
	Star,
	OpenParen,
	CloseParen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
	pub(crate) kind: TokenKind,
	pub(crate) text: String,
	pub(crate) line: usize,
	pub(crate) start: usize,
	pub(crate) end: usize,
}

pub(crate) fn lex(text: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut chars = text.char_indices().peekable();
	let mut line = 0_usize;
	let mut column = 0_usize;

	while let Some((idx, ch)) = chars.next() {
		if ch == '\n' {
			line += 1;
			column = 0;

			continue;
		}
		if ch.is_whitespace() {
			column += ch.len_utf8();

			continue;
		}

		let start = column;

		match ch {
			'{' => tokens.push(punct(TokenKind::OpenBrace, "{", line, start)),
			'}' => tokens.push(punct(TokenKind::CloseBrace, "}", line, start)),
			',' => tokens.push(punct(TokenKind::Comma, ",", line, start)),
			';' => tokens.push(punct(TokenKind::Semi, ";", line, start)),
			'*' => tokens.push(punct(TokenKind::Star, "*", line, start)),
			'(' => tokens.push(punct(TokenKind::OpenParen, "(", line, start)),
			')' => tokens.push(punct(TokenKind::CloseParen, ")", line, start)),
			':' =>
				if chars.peek().is_some_and(|(_, next)| *next == ':') {
					chars.next();
					column += 1;

					tokens.push(Token {
						kind: TokenKind::PathSep,
						text: "::".to_owned(),
						line,
						start,
						end: start + 2,
					});
				},
			_ if ch.is_ascii_alphabetic() || ch == '_' => {
				let mut end_idx = idx + ch.len_utf8();

				while let Some((next_idx, next)) = chars.peek().copied() {
					if next.is_ascii_alphanumeric() || next == '_' {
						chars.next();

						end_idx = next_idx + next.len_utf8();
					} else {
						break;
					}
				}

				let word = &text[idx..end_idx];
				let end = start + word.len();

				tokens.push(Token {
					kind: keyword_kind(word),
					text: word.to_owned(),
					line,
					start,
					end,
				});
				column = end;

				continue;
			},
			// Leniency policy: anything else is dropped without an error.
			_ => {},
		}

		column += ch.len_utf8();
	}

	tokens
}

fn keyword_kind(word: &str) -> TokenKind {
	match word {
		"use" => TokenKind::Use,
		"pub" => TokenKind::Pub,
		"as" => TokenKind::As,
		"self" => TokenKind::SelfKw,
		"crate" => TokenKind::Crate,
		"super" => TokenKind::Super,
		"in" => TokenKind::In,
		_ => TokenKind::Ident,
	}
}

fn punct(kind: TokenKind, text: &str, line: usize, start: usize) -> Token {
	Token { kind, text: text.to_owned(), line, start, end: start + text.len() }
}
