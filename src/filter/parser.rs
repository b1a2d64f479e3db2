use crate::error::{CatalogError, CatalogResult};
use crate::record::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    Name,
    Author,
    Price,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Operand {
    Number(f64),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Clause {
    field: Field,
    comparison: Comparison,
    operand: Operand,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Number(f64, String),
    Op(Comparison),
    And,
}

/// A parsed filter: a conjunction of field comparisons.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterExpr {
    clauses: Vec<Clause>,
}

impl FilterExpr {
    /// Parse and type-check an expression such as
    /// `author ~ 'herbert' and price < 20`.
    pub fn parse(expression: &str) -> CatalogResult<Self> {
        let tokens = tokenize(expression)?;
        if tokens.is_empty() {
            return Err(invalid("expression is empty"));
        }

        let mut clauses = Vec::new();
        let mut tokens = tokens.into_iter().peekable();
        loop {
            clauses.push(parse_clause(&mut tokens)?);
            match tokens.next() {
                None => break,
                Some(Token::And) => {
                    if tokens.peek().is_none() {
                        return Err(invalid("expected a clause after 'and'"));
                    }
                }
                Some(other) => return Err(invalid(format!("unexpected {}", describe(&other)))),
            }
        }
        Ok(FilterExpr { clauses })
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

impl Clause {
    fn matches(&self, record: &Record) -> bool {
        match (self.field, &self.operand) {
            (Field::Price, Operand::Number(expected)) => {
                compare_numbers(record.price, *expected, self.comparison)
            }
            (Field::Name, Operand::Text(expected)) => {
                compare_text(&record.name, expected, self.comparison)
            }
            (Field::Author, Operand::Text(expected)) => {
                compare_text(&record.author, expected, self.comparison)
            }
            // Rejected by parse_clause.
            _ => false,
        }
    }
}

fn compare_numbers(actual: f64, expected: f64, comparison: Comparison) -> bool {
    match comparison {
        Comparison::Eq => actual == expected,
        Comparison::Ne => actual != expected,
        Comparison::Lt => actual < expected,
        Comparison::Le => actual <= expected,
        Comparison::Gt => actual > expected,
        Comparison::Ge => actual >= expected,
        Comparison::Contains => false,
    }
}

fn compare_text(actual: &str, expected: &str, comparison: Comparison) -> bool {
    let actual = actual.trim().to_lowercase();
    let expected = expected.trim().to_lowercase();
    match comparison {
        Comparison::Eq => actual == expected,
        Comparison::Ne => actual != expected,
        Comparison::Lt => actual < expected,
        Comparison::Le => actual <= expected,
        Comparison::Gt => actual > expected,
        Comparison::Ge => actual >= expected,
        Comparison::Contains => actual.contains(&expected),
    }
}

fn parse_clause<I>(tokens: &mut std::iter::Peekable<I>) -> CatalogResult<Clause>
where
    I: Iterator<Item = Token>,
{
    let field = match tokens.next() {
        Some(Token::Word(word)) => parse_field(&word)?,
        Some(other) => return Err(invalid(format!("expected a field, found {}", describe(&other)))),
        None => return Err(invalid("expected a field")),
    };
    let comparison = match tokens.next() {
        Some(Token::Op(comparison)) => comparison,
        Some(other) => {
            return Err(invalid(format!(
                "expected a comparison operator, found {}",
                describe(&other)
            )))
        }
        None => return Err(invalid("expected a comparison operator")),
    };
    let operand = match (field, tokens.next()) {
        (Field::Price, Some(Token::Number(value, _))) => Operand::Number(value),
        (Field::Price, Some(other)) => {
            return Err(invalid(format!("price must be compared with a number, found {}", describe(&other))))
        }
        (_, Some(Token::Number(_, raw))) => Operand::Text(raw),
        (_, Some(Token::Word(word))) => Operand::Text(word),
        (_, Some(Token::Quoted(text))) => Operand::Text(text),
        (_, Some(other)) => return Err(invalid(format!("expected a value, found {}", describe(&other)))),
        (_, None) => return Err(invalid("expected a value")),
    };
    if field == Field::Price && comparison == Comparison::Contains {
        return Err(invalid("'~' cannot be applied to price"));
    }
    Ok(Clause {
        field,
        comparison,
        operand,
    })
}

fn parse_field(word: &str) -> CatalogResult<Field> {
    match word.to_ascii_lowercase().as_str() {
        "name" | "nome" => Ok(Field::Name),
        "author" | "autor" => Ok(Field::Author),
        "price" | "preco" => Ok(Field::Price),
        _ => Err(invalid(format!("unknown field '{word}'"))),
    }
}

fn tokenize(expression: &str) -> CatalogResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        match ch {
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => text.push(escaped),
                            None => break,
                        },
                        c if c == ch => {
                            closed = true;
                            break;
                        }
                        c => text.push(c),
                    }
                }
                if !closed {
                    return Err(invalid(format!("unterminated string starting at {start}")));
                }
                tokens.push(Token::Quoted(text));
            }
            '=' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                }
                tokens.push(Token::Op(Comparison::Eq));
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => tokens.push(Token::Op(Comparison::Ne)),
                    _ => return Err(invalid(format!("expected '!=' at {start}"))),
                }
            }
            '<' | '>' => {
                chars.next();
                let or_equal = matches!(chars.peek(), Some((_, '=')));
                if or_equal {
                    chars.next();
                }
                tokens.push(Token::Op(match (ch, or_equal) {
                    ('<', false) => Comparison::Lt,
                    ('<', true) => Comparison::Le,
                    ('>', false) => Comparison::Gt,
                    _ => Comparison::Ge,
                }));
            }
            '~' => {
                chars.next();
                tokens.push(Token::Op(Comparison::Contains));
            }
            '&' => {
                chars.next();
                match chars.next() {
                    Some((_, '&')) => tokens.push(Token::And),
                    _ => return Err(invalid(format!("expected '&&' at {start}"))),
                }
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut end = start;
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_') {
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let raw = &expression[start..end];
                // Not every value starting with a digit is a number: `3body`.
                match raw.parse::<f64>().ok().filter(|value| value.is_finite()) {
                    Some(value) => tokens.push(Token::Number(value, raw.to_string())),
                    None => tokens.push(Token::Word(raw.to_string())),
                }
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start;
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' {
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &expression[start..end];
                if word.eq_ignore_ascii_case("and") {
                    tokens.push(Token::And);
                } else {
                    tokens.push(Token::Word(word.to_string()));
                }
            }
            other => return Err(invalid(format!("unexpected character '{other}' at {start}"))),
        }
    }

    Ok(tokens)
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(word) => format!("'{word}'"),
        Token::Quoted(text) => format!("\"{text}\""),
        Token::Number(_, raw) => format!("number {raw}"),
        Token::Op(_) => "an operator".to_string(),
        Token::And => "'and'".to_string(),
    }
}

fn invalid(reason: impl Into<String>) -> CatalogError {
    CatalogError::validation("filter", reason)
}
