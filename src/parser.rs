use crate::ast::{BinaryOp, Callee, Expr, UnaryOp};
use crate::error::{NsError, Span};
use crate::fragments;
use crate::lexer::{Lexer, Token, TokenType};
use log::debug;
use std::mem;

/// Recursive-descent parser pulling tokens from the lexer one at a time.
///
/// ```text
/// expression  := addsub
/// addsub      := muldiv (('+'|'-') muldiv)*
/// muldiv      := unary (('*'|'/') unary)*
/// unary       := ('+'|'-') unary | postfix_term
/// postfix_term:= primary [ '(' args ')' | '=' expression ]
/// primary     := id | num | str | none | '(' expression ')'
/// ```
pub struct Parser {
    lexer: Lexer,
    current: Token,
    previous: Token,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let placeholder = Token::new(TokenType::Eof, String::new(), Span::single(0));
        Self {
            lexer: Lexer::new(source),
            current: placeholder.clone(),
            previous: placeholder,
        }
    }

    /// Parses exactly one expression spanning the whole line.
    pub fn parse(&mut self) -> Result<Expr, NsError> {
        self.advance()?;

        let expr = self.expression()?;
        self.expect(TokenType::Eof)?;

        debug!("parsed {}", expr);
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, NsError> {
        self.addsub()
    }

    fn addsub(&mut self) -> Result<Expr, NsError> {
        let mut expr = self.muldiv()?;

        while self.match_types(&[TokenType::Plus, TokenType::Minus])? {
            let operator_token = self.previous.clone();
            let operator = match operator_token.token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                _ => unreachable!(),
            };

            let right = self.muldiv()?;
            let span = expr.span().to(right.span());

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                operator_span: operator_token.span,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn muldiv(&mut self) -> Result<Expr, NsError> {
        let mut expr = self.unary()?;

        while self.match_types(&[TokenType::Star, TokenType::Slash])? {
            let operator_token = self.previous.clone();
            let operator = match operator_token.token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                _ => unreachable!(),
            };

            let right = self.unary()?;
            let span = expr.span().to(right.span());

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                operator_span: operator_token.span,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, NsError> {
        if self.match_types(&[TokenType::Plus, TokenType::Minus])? {
            let operator_token = self.previous.clone();
            let operator = match operator_token.token_type {
                TokenType::Plus => UnaryOp::Plus,
                TokenType::Minus => UnaryOp::Negate,
                _ => unreachable!(),
            };

            let operand = self.unary()?;
            let span = operator_token.span.to(operand.span());

            return Ok(Expr::Unary {
                operator,
                operator_span: operator_token.span,
                operand: Box::new(operand),
                span,
            });
        }

        self.postfix_term()
    }

    fn postfix_term(&mut self) -> Result<Expr, NsError> {
        let expr = self.primary()?;

        if self.check(TokenType::LeftParen) {
            let callee = match expr {
                Expr::Identifier { name, span } => Callee::Builtin { name, span },
                Expr::Str { value, span } => Callee::Program { path: value, span },
                other => {
                    return Err(NsError::parse_error(
                        *other.span(),
                        fragments!["expected string or identifier call name"],
                    )
                    .with_help("call a builtin as `name(...)` or a program as `'path'(...)`"))
                }
            };

            self.advance()?;
            return self.finish_call(callee);
        }

        if self.check(TokenType::Equal) {
            let (name, name_span) = match expr {
                Expr::Identifier { name, span } => (name, span),
                other => {
                    return Err(NsError::parse_error(
                        *other.span(),
                        fragments!["expected an identifier when assigning"],
                    ))
                }
            };

            self.advance()?;
            let value = self.expression()?;
            let span = name_span.to(value.span());

            return Ok(Expr::Assign {
                name,
                name_span,
                value: Box::new(value),
                span,
            });
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Callee) -> Result<Expr, NsError> {
        let open_paren = self.previous.span;
        let mut args = Vec::new();

        if !self.match_types(&[TokenType::RightParen])? {
            loop {
                if self.check(TokenType::Eof) {
                    return Err(self.unclosed_call(open_paren));
                }

                args.push(self.expression()?);

                if self.match_types(&[TokenType::RightParen])? {
                    break;
                }

                if !self.match_types(&[TokenType::Comma])? || self.check(TokenType::RightParen) {
                    return Err(self.unclosed_call(open_paren));
                }
            }
        }

        let span = callee.span().to(&self.previous.span);
        Ok(Expr::Call { callee, args, span })
    }

    fn unclosed_call(&self, open_paren: Span) -> NsError {
        NsError::parse_error(
            open_paren.to(&self.previous.span),
            fragments!["unclosed call parameters list"],
        )
        .with_help("arguments are separated by `,` and closed by `)`")
    }

    fn primary(&mut self) -> Result<Expr, NsError> {
        let token = self.current.clone();

        let expr = match token.token_type {
            TokenType::Identifier => Expr::Identifier {
                name: token.lexeme,
                span: token.span,
            },
            TokenType::Num => {
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    NsError::parse_error(token.span, fragments!["invalid number `", token.lexeme, "`"])
                })?;
                Expr::Num {
                    value,
                    span: token.span,
                }
            }
            TokenType::String => Expr::Str {
                value: token.lexeme,
                span: token.span,
            },
            TokenType::None => Expr::None { span: token.span },
            TokenType::LeftParen => {
                self.advance()?;
                let expr = self.expression()?;
                self.expect(TokenType::RightParen)?;
                return Ok(expr);
            }
            _ => {
                let error = NsError::parse_error(
                    token.span,
                    fragments!["unexpected token (found `", token, "`)"],
                );

                return Err(match token.token_type {
                    TokenType::Bad => error.with_help(format!("`{}` is not part of the language", token)),
                    TokenType::Eof => error.with_help("the line ended while expecting a term"),
                    _ => error,
                });
            }
        };

        self.advance()?;
        Ok(expr)
    }

    fn expect(&mut self, token_type: TokenType) -> Result<Token, NsError> {
        if !self.check(token_type) {
            return Err(NsError::parse_error(
                self.current.span,
                fragments!["expected `", token_type.describe(), "` (found `", self.current, "`)"],
            ));
        }

        self.advance()?;
        Ok(self.previous.clone())
    }

    fn match_types(&mut self, types: &[TokenType]) -> Result<bool, NsError> {
        for token_type in types {
            if self.check(*token_type) {
                self.advance()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.current.token_type == token_type
    }

    fn advance(&mut self) -> Result<(), NsError> {
        let next = self.lexer.next_token()?;
        self.previous = mem::replace(&mut self.current, next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Expr, NsError> {
        Parser::new(source).parse()
    }

    fn parsed(source: &str) -> String {
        parse(source).unwrap().to_string()
    }

    fn parse_error(source: &str) -> NsError {
        parse(source).unwrap_err()
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(parsed("2 + 3 * 4"), "(2 + (3 * 4))");
        assert_eq!(parsed("(2 + 3) * 4"), "((2 + 3) * 4)");
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(parsed("1 - 2 - 3"), "((1 - 2) - 3)");
        assert_eq!(parsed("8 / 4 / 2"), "((8 / 4) / 2)");
        assert_eq!(parsed("1 - 2 * 3 + 4"), "((1 - (2 * 3)) + 4)");
    }

    #[test]
    fn unary_chains_nest() {
        assert_eq!(parsed("--5"), "--5");
        assert_eq!(parsed("-2 * 3"), "(-2 * 3)");
        assert_eq!(parsed("1 - -x"), "(1 - -x)");

        match parse("+-5").unwrap() {
            Expr::Unary {
                operator: UnaryOp::Plus,
                operand,
                span,
                ..
            } => {
                assert_eq!(span, Span::new(0, 3));
                assert!(matches!(*operand, Expr::Unary { operator: UnaryOp::Negate, .. }));
            }
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn calls_and_assignments() {
        assert_eq!(parsed("f()"), "f()");
        assert_eq!(parsed("f(1, 'a', g(x))"), "f(1, 'a', g(x))");
        assert_eq!(parsed("'/bin/ls'('-l')"), "'/bin/ls'('-l')");
        assert_eq!(parsed("x = 1 + 2"), "x = (1 + 2)");
        assert_eq!(parsed("x = y = none"), "x = y = none");
    }

    #[test]
    fn call_callee_keeps_its_kind() {
        match parse("print(1)").unwrap() {
            Expr::Call { callee: Callee::Builtin { name, .. }, args, span } => {
                assert_eq!(name, "print");
                assert_eq!(args.len(), 1);
                assert_eq!(span, Span::new(0, 8));
            }
            other => panic!("expected builtin call, got {:?}", other),
        }

        assert!(matches!(
            parse("'prog'()").unwrap(),
            Expr::Call { callee: Callee::Program { .. }, .. }
        ));
    }

    #[test]
    fn binary_span_covers_both_operands() {
        match parse(" 1 +  22 ").unwrap() {
            Expr::Binary { span, operator_span, .. } => {
                assert_eq!(span, Span::new(1, 8));
                assert_eq!(operator_span, Span::new(3, 4));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn invalid_call_names() {
        let error = parse_error("5(1)");
        assert_eq!(error.message(), "expected string or identifier call name");
        assert_eq!(parse_error("(1 + 2)(3)").span, Span::new(1, 6));
    }

    #[test]
    fn invalid_assignment_targets() {
        assert_eq!(parse_error("1 = x").message(), "expected an identifier when assigning");
        assert_eq!(parse_error("'a' = 1").message(), "expected an identifier when assigning");
    }

    #[test]
    fn unclosed_call_lists() {
        let error = parse_error("foo(1,2");
        assert_eq!(error.message(), "unclosed call parameters list");
        assert_eq!(error.span, Span::new(3, 7));

        let error = parse_error("foo(1,)");
        assert_eq!(error.message(), "unclosed call parameters list");
        assert_eq!(error.span, Span::new(3, 6));

        assert_eq!(parse_error("foo(").message(), "unclosed call parameters list");
        assert_eq!(parse_error("foo(1 2)").message(), "unclosed call parameters list");
    }

    #[test]
    fn one_expression_per_line() {
        let error = parse_error("1 2");
        assert_eq!(error.message(), "expected `<eof>` (found `2`)");
        assert_eq!(error.span, Span::new(2, 3));

        assert_eq!(parse_error("f(1) = 2").message(), "expected `<eof>` (found `=`)");
        assert_eq!(parse_error("1 + 2)").message(), "expected `<eof>` (found `)`)");
    }

    #[test]
    fn unexpected_terms() {
        assert_eq!(parse_error("").message(), "unexpected token (found `<eof>`)");
        assert_eq!(parse_error("1 +").message(), "unexpected token (found `<eof>`)");
        assert_eq!(parse_error("1 + $").message(), "unexpected token (found `$`)");
        assert_eq!(parse_error("* 2").message(), "unexpected token (found `*`)");
        assert_eq!(parse_error("(1 + 2").message(), "expected `)` (found `<eof>`)");
    }

    #[test]
    fn lexer_errors_surface_through_the_parser() {
        assert_eq!(parse_error("1 + 0.").message(), "number cannot end with a dot");
    }
}
