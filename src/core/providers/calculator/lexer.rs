//! Tokenizer for calculator expressions

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Ident(String),
    True,
    False,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    DoubleStar,
    LParen,
    RParen,
    Comma,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Int(i) => return write!(f, "{i}"),
            Token::Float(x) => return write!(f, "{x}"),
            Token::Ident(name) => return write!(f, "{name}"),
            Token::True => "True",
            Token::False => "False",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::DoubleSlash => "//",
            Token::Percent => "%",
            Token::DoubleStar => "**",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Eq => "==",
            Token::Ne => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Token plus the character offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let starts_fraction = c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        if c.is_ascii_digit() || starts_fraction {
            let (token, next) = lex_number(&chars, i)?;
            tokens.push(Spanned { token, pos: start });
            i = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let token = match word.as_str() {
                "True" => Token::True,
                "False" => Token::False,
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                _ => Token::Ident(word),
            };
            tokens.push(Spanned { token, pos: start });
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (token, width) = match (c, next) {
            ('*', Some('*')) => (Token::DoubleStar, 2),
            ('/', Some('/')) => (Token::DoubleSlash, 2),
            ('=', Some('=')) => (Token::Eq, 2),
            ('!', Some('=')) => (Token::Ne, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('^', _) => {
                return Err(format!(
                    "unsupported operator '^' at position {start}; use '**' for exponentiation"
                ))
            }
            _ => return Err(format!("unexpected character '{c}' at position {start}")),
        };
        tokens.push(Spanned { token, pos: start });
        i += width;
    }

    Ok(tokens)
}

fn lex_number(chars: &[char], mut i: usize) -> Result<(Token, usize), String> {
    let start = i;
    let mut is_float = false;

    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '_') {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        is_float = true;
        i += 1;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '_') {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            is_float = true;
            i = j;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }

    let text: String = chars[start..i].iter().filter(|c| **c != '_').collect();
    let token = if is_float {
        Token::Float(
            text.parse()
                .map_err(|_| format!("invalid number '{text}' at position {start}"))?,
        )
    } else {
        Token::Int(
            text.parse()
                .map_err(|_| format!("integer literal '{text}' is too large"))?,
        )
    };
    Ok((token, i))
}
