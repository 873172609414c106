//! Infix to postfix conversion (shunting-yard) with a token class state machine
//! rejecting illegal sequences.

use ::rucalc_common::{
    anyhow::anyhow,
    error::{Result, RucalcError},
    task::Operator,
};

use super::tokens::Token;

/// Outcome of compiling an expression.
#[derive(Debug, PartialEq)]
pub(crate) enum Compiled {
    /// The expression is a single number, kept as its literal text.
    Resolved(String),
    /// Postfix sequence holding at least one operator.
    Postfix(Vec<Token>),
}

/// Class of the previously accepted lexeme.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Class {
    Start,
    Number,
    Operator,
    LeftBracket,
    RightBracket,
}

impl Class {
    fn may_follow(self, prev: Class) -> bool {
        match self {
            Class::Number | Class::LeftBracket => {
                matches!(prev, Class::Start | Class::Operator | Class::LeftBracket)
            }
            Class::Operator | Class::RightBracket => {
                matches!(prev, Class::Number | Class::RightBracket)
            }
            Class::Start => false,
        }
    }
}

enum Pending {
    Operator(Operator),
    LeftBracket,
}

/// Split on operators and brackets, dropping whitespace.
fn lex(source: &str) -> Vec<&str> {
    let mut lexemes = vec![];
    let mut start = None;
    for (i, c) in source.char_indices() {
        let is_symbol = matches!(c, '+' | '-' | '*' | '/' | '(' | ')');
        if is_symbol || c.is_whitespace() {
            if let Some(s) = start.take() {
                lexemes.push(&source[s..i]);
            }
            if is_symbol {
                lexemes.push(&source[i..i + c.len_utf8()]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        lexemes.push(&source[s..]);
    }
    lexemes
}

fn parse_number(lexeme: &str) -> Result<f64> {
    // `inf` and `NaN` parse as f64 but are not literals we accept
    let starts_numeric = lexeme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    lexeme
        .parse::<f64>()
        .ok()
        .filter(|_| starts_numeric)
        .ok_or_else(|| RucalcError::invalid_expression(anyhow!("incorrect token: '{}'", lexeme)))
}

fn check(prev: Class, current: Class, lexeme: &str) -> Result<()> {
    if current.may_follow(prev) {
        Ok(())
    } else {
        Err(RucalcError::invalid_expression(anyhow!(
            "incorrect sequence near token: '{}'",
            lexeme
        )))
    }
}

fn unpaired_brackets() -> RucalcError {
    RucalcError::invalid_expression(anyhow!("unpaired brackets"))
}

/// Compile an infix expression into postfix tokens.
pub(crate) fn compile(source: &str) -> Result<Compiled> {
    let mut output = vec![];
    let mut stack = vec![];
    let mut prev = Class::Start;
    let mut literal = "";

    for lexeme in lex(source) {
        prev = match lexeme {
            "(" => {
                check(prev, Class::LeftBracket, lexeme)?;
                stack.push(Pending::LeftBracket);
                Class::LeftBracket
            }
            ")" => {
                check(prev, Class::RightBracket, lexeme)?;
                loop {
                    match stack.pop() {
                        Some(Pending::Operator(op)) => output.push(Token::Operator(op)),
                        Some(Pending::LeftBracket) => break,
                        None => return Err(unpaired_brackets()),
                    }
                }
                Class::RightBracket
            }
            _ => match Operator::from_symbol(lexeme) {
                Some(op) => {
                    // unary sign: rewrite `-x` as `0 - x`
                    if matches!(prev, Class::Start | Class::LeftBracket)
                        && matches!(op, Operator::Add | Operator::Sub)
                    {
                        output.push(Token::Number(0.0));
                        prev = Class::Number;
                    }
                    check(prev, Class::Operator, lexeme)?;
                    while let Some(&Pending::Operator(top)) = stack.last() {
                        if top.precedence() < op.precedence() {
                            break;
                        }
                        output.push(Token::Operator(top));
                        stack.pop();
                    }
                    stack.push(Pending::Operator(op));
                    Class::Operator
                }
                None => {
                    let value = parse_number(lexeme)?;
                    check(prev, Class::Number, lexeme)?;
                    output.push(Token::Number(value));
                    literal = lexeme;
                    Class::Number
                }
            },
        };
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Operator(op) => output.push(Token::Operator(op)),
            Pending::LeftBracket => return Err(unpaired_brackets()),
        }
    }

    if !matches!(prev, Class::Number | Class::RightBracket) {
        return Err(RucalcError::invalid_expression(anyhow!(
            "incorrect sequence near last token"
        )));
    }

    if output.len() == 1 {
        Ok(Compiled::Resolved(literal.to_owned()))
    } else {
        Ok(Compiled::Postfix(output))
    }
}
