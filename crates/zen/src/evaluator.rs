//! Expression evaluation: left-to-right, single-token lookahead, strictly
//! right-associative with no operator precedence (see `SPEC_FULL.md` §4.4 —
//! this is a deliberately preserved quirk, not an oversight).

use std::io::Write as _;

use indexmap::IndexMap;
use log::{trace, warn};

use crate::{
    cursor::{advance, eat, kind_at},
    host::{Crypto as _, Fs as _, Graphics as _},
    interpreter::Interpreter,
    token::{Token, TokenKind},
    value::Value,
};

impl Interpreter {
    /// Parses and evaluates one expression starting at `*pos`, advancing past it.
    pub fn eval_expr(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        let lhs = self.eval_primary(tokens, pos);
        self.eval_operator_tail(tokens, pos, lhs)
    }

    fn eval_operator_tail(&mut self, tokens: &[Token], pos: &mut usize, lhs: Value) -> Value {
        let Some(op) = arith_or_cmp_kind(kind_at(tokens, *pos)) else {
            return lhs;
        };
        *pos += 1;
        let rhs = self.eval_expr(tokens, pos);
        combine(op, &lhs, &rhs)
    }

    fn eval_primary(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        let Some(tok) = advance(tokens, pos).cloned() else {
            return Value::Null;
        };
        match tok.kind {
            TokenKind::Number => Value::Number(tok.lexeme.parse().unwrap_or(0.0)),
            TokenKind::String => Value::String(tok.lexeme),
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::Null => Value::Null,
            TokenKind::Undefined => Value::Undefined,
            TokenKind::LBracket => self.eval_array_literal(tokens, pos),
            TokenKind::LBrace => self.eval_dict_literal(tokens, pos),
            TokenKind::Range => self.eval_range_call(tokens, pos),
            TokenKind::Input => self.eval_input_call(tokens, pos),
            TokenKind::Length => self.eval_unary_intrinsic(tokens, pos, |v| match v {
                Value::Array(a) => Value::Number(a.len() as f64),
                Value::String(s) => Value::Number(s.chars().count() as f64),
                Value::Dict(d) => Value::Number(d.len() as f64),
                _ => Value::Number(0.0),
            }),
            TokenKind::Keys => self.eval_unary_intrinsic(tokens, pos, |v| match v {
                Value::Dict(d) => Value::Array(d.keys().cloned().map(Value::String).collect()),
                _ => Value::Array(Vec::new()),
            }),
            TokenKind::Values => self.eval_unary_intrinsic(tokens, pos, |v| match v {
                Value::Dict(d) => Value::Array(d.values().cloned().collect()),
                _ => Value::Array(Vec::new()),
            }),
            TokenKind::Read => self.eval_unary_intrinsic_str(tokens, pos, |me, path| Value::String(me.host.fs.read(&path))),
            TokenKind::Exists => self.eval_unary_intrinsic_str(tokens, pos, |me, path| Value::Bool(me.host.fs.exists(&path))),
            TokenKind::Hash => self.eval_hash_call(tokens, pos),
            TokenKind::Encrypt => self.eval_binary_intrinsic_str(tokens, pos, |me, data, key| Value::String(me.host.crypto.encrypt(&data, &key))),
            TokenKind::Decrypt => self.eval_binary_intrinsic_str(tokens, pos, |me, data, key| Value::String(me.host.crypto.decrypt(&data, &key))),
            TokenKind::Salt => self.eval_salt_call(tokens, pos),
            TokenKind::Window => self.eval_window_call(tokens, pos),
            TokenKind::Ident => self.eval_ident(tokens, pos, &tok.lexeme),
            TokenKind::Minus => {
                let operand = self.eval_primary(tokens, pos);
                Value::Number(-operand.as_number())
            }
            TokenKind::Bang => {
                let operand = self.eval_primary(tokens, pos);
                Value::Bool(!operand.is_truthy())
            }
            other => {
                trace!("zen::eval: unexpected token {other:?} in primary position");
                Value::Null
            }
        }
    }

    fn eval_array_literal(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        let mut items = Vec::new();
        if eat(tokens, pos, TokenKind::RBracket) {
            return Value::Array(items);
        }
        loop {
            items.push(self.eval_expr(tokens, pos));
            if !eat(tokens, pos, TokenKind::Comma) {
                break;
            }
        }
        eat(tokens, pos, TokenKind::RBracket);
        Value::Array(items)
    }

    fn eval_dict_literal(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        let mut map = IndexMap::new();
        if eat(tokens, pos, TokenKind::RBrace) {
            return Value::Dict(map);
        }
        loop {
            let key = match advance(tokens, pos) {
                Some(t) if t.kind == TokenKind::String || t.kind == TokenKind::Ident => t.lexeme.clone(),
                _ => String::new(),
            };
            eat(tokens, pos, TokenKind::Colon);
            let value = self.eval_expr(tokens, pos);
            map.insert(key, value);
            if !eat(tokens, pos, TokenKind::Comma) {
                break;
            }
        }
        eat(tokens, pos, TokenKind::RBrace);
        Value::Dict(map)
    }

    fn eval_range_call(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::Array(Vec::new());
        }
        let mut args = Vec::new();
        if kind_at(tokens, *pos) != TokenKind::RParen {
            loop {
                args.push(self.eval_expr(tokens, pos));
                if !eat(tokens, pos, TokenKind::Comma) {
                    break;
                }
            }
        }
        eat(tokens, pos, TokenKind::RParen);
        let (start, end, step) = match args.as_slice() {
            [end] => (0.0, end.as_number(), 1.0),
            [start, end] => (start.as_number(), end.as_number(), 1.0),
            [start, end, step] => (start.as_number(), end.as_number(), step.as_number()),
            _ => (0.0, 0.0, 1.0),
        };
        let mut out = Vec::new();
        if step > 0.0 {
            let mut i = start;
            while i < end {
                out.push(Value::Number(i));
                i += step;
            }
        } else if step < 0.0 {
            let mut i = start;
            while i > end {
                out.push(Value::Number(i));
                i += step;
            }
        }
        Value::Array(out)
    }

    fn eval_input_call(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::String(String::new());
        }
        let prompt = if kind_at(tokens, *pos) != TokenKind::RParen {
            match self.eval_expr(tokens, pos) {
                Value::String(s) => s,
                other => other.to_string(),
            }
        } else {
            String::new()
        };
        eat(tokens, pos, TokenKind::RParen);
        if !prompt.is_empty() {
            print!("{prompt}");
            let _ = std::io::stdout().flush();
        }
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        Value::String(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn eval_unary_intrinsic(&mut self, tokens: &[Token], pos: &mut usize, f: impl FnOnce(&Value) -> Value) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::Null;
        }
        let arg = self.eval_expr(tokens, pos);
        eat(tokens, pos, TokenKind::RParen);
        f(&arg)
    }

    fn eval_unary_intrinsic_str(&mut self, tokens: &[Token], pos: &mut usize, f: impl FnOnce(&mut Self, String) -> Value) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::Null;
        }
        let arg = self.eval_expr(tokens, pos).to_string();
        eat(tokens, pos, TokenKind::RParen);
        f(self, arg)
    }

    fn eval_binary_intrinsic_str(&mut self, tokens: &[Token], pos: &mut usize, f: impl FnOnce(&mut Self, String, String) -> Value) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::Null;
        }
        let a = self.eval_expr(tokens, pos).to_string();
        eat(tokens, pos, TokenKind::Comma);
        let b = self.eval_expr(tokens, pos).to_string();
        eat(tokens, pos, TokenKind::RParen);
        f(self, a, b)
    }

    fn eval_hash_call(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::Null;
        }
        let data = self.eval_expr(tokens, pos).to_string();
        let algo = if eat(tokens, pos, TokenKind::Comma) {
            self.eval_expr(tokens, pos).to_string()
        } else {
            "sha256".to_string()
        };
        eat(tokens, pos, TokenKind::RParen);
        Value::String(self.host.crypto.hash(&data, &algo))
    }

    fn eval_salt_call(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::String(self.host.crypto.salt(32));
        }
        let len = if kind_at(tokens, *pos) != TokenKind::RParen {
            self.eval_expr(tokens, pos).as_number() as i64
        } else {
            0
        };
        eat(tokens, pos, TokenKind::RParen);
        Value::String(self.host.crypto.salt(len.max(0) as usize))
    }

    fn eval_window_call(&mut self, tokens: &[Token], pos: &mut usize) -> Value {
        if !eat(tokens, pos, TokenKind::LParen) {
            return Value::Null;
        }
        let mut args = Vec::new();
        if kind_at(tokens, *pos) != TokenKind::RParen {
            loop {
                args.push(self.eval_expr(tokens, pos));
                if !eat(tokens, pos, TokenKind::Comma) {
                    break;
                }
            }
        }
        eat(tokens, pos, TokenKind::RParen);
        let title = args.first().map(Value::to_string).unwrap_or_default();
        let width = args.get(1).map(Value::as_number).unwrap_or(640.0) as u32;
        let height = args.get(2).map(Value::as_number).unwrap_or(480.0) as u32;
        let handle = self.host.graphics.open_window(&title, width, height);
        Value::Window(handle)
    }

    fn eval_ident(&mut self, tokens: &[Token], pos: &mut usize, name: &str) -> Value {
        match kind_at(tokens, *pos) {
            TokenKind::LParen => self.eval_call(tokens, pos, name),
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let delta = if kind_at(tokens, *pos) == TokenKind::PlusPlus { 1.0 } else { -1.0 };
                *pos += 1;
                let previous = self.env.get(name).cloned().unwrap_or(Value::Number(0.0));
                let updated = Value::Number(previous.as_number() + delta);
                let _ = self.env.set(name, updated, false);
                previous
            }
            TokenKind::LBracket => {
                *pos += 1;
                let index = self.eval_expr(tokens, pos);
                eat(tokens, pos, TokenKind::RBracket);
                self.index_read(name, &index)
            }
            _ => self.env.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    fn index_read(&self, name: &str, index: &Value) -> Value {
        match self.env.get(name) {
            Some(Value::Array(items)) => {
                let i = index.as_number();
                if i >= 0.0 && (i as usize) < items.len() {
                    items[i as usize].clone()
                } else {
                    Value::Null
                }
            }
            Some(Value::Dict(map)) => map.get(&index.to_string()).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    fn eval_call(&mut self, tokens: &[Token], pos: &mut usize, name: &str) -> Value {
        *pos += 1; // consume '('
        let mut args = Vec::new();
        if kind_at(tokens, *pos) != TokenKind::RParen {
            loop {
                args.push(self.eval_expr(tokens, pos));
                if !eat(tokens, pos, TokenKind::Comma) {
                    break;
                }
            }
        }
        eat(tokens, pos, TokenKind::RParen);

        let Some(function) = self.functions.get(name).cloned() else {
            return Value::Null;
        };

        if self.recursion.enter().is_err() {
            println!("Error: maximum recursion depth exceeded");
            warn!("zen::eval: recursion limit exceeded calling '{name}'");
            return Value::Null;
        }

        let saved_return = (std::mem::replace(&mut self.return_val, Value::Null), self.is_returning);
        self.is_returning = false;
        let snapshot = self.env.enter_scope();
        for (i, param) in function.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or(Value::Null);
            self.env.declare(param, value, false);
        }

        // `function.body` is already a captured `{ ... }` slice; skip the
        // opening brace and run statements until the matching close.
        let mut stmt_pos = 1;
        self.exec_block(&function.body, &mut stmt_pos);

        let result = if self.is_returning {
            std::mem::replace(&mut self.return_val, Value::Null)
        } else {
            Value::Null
        };

        self.env.exit_scope(snapshot);
        self.recursion.exit();
        (self.return_val, self.is_returning) = saved_return;
        result
    }
}

fn arith_or_cmp_kind(kind: TokenKind) -> Option<TokenKind> {
    matches!(
        kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::StarStar
            | TokenKind::Amp
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::Shl
            | TokenKind::Shr
            | TokenKind::EqEq
            | TokenKind::EqEqEq
            | TokenKind::NotEq
            | TokenKind::NotEqEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::AmpAmp
            | TokenKind::PipePipe
    )
    .then_some(kind)
}

/// Applies a binary operator to two already-evaluated operands (§4.2).
fn combine(op: TokenKind, lhs: &Value, rhs: &Value) -> Value {
    match op {
        TokenKind::Plus => {
            if let Value::String(s) = lhs {
                Value::String(format!("{s}{rhs}"))
            } else {
                Value::Number(lhs.as_number() + rhs.as_number())
            }
        }
        TokenKind::Minus => Value::Number(lhs.as_number() - rhs.as_number()),
        TokenKind::Star => Value::Number(lhs.as_number() * rhs.as_number()),
        TokenKind::Slash => {
            let r = rhs.as_number();
            Value::Number(if r == 0.0 { 0.0 } else { lhs.as_number() / r })
        }
        TokenKind::Percent => {
            let r = rhs.as_number();
            Value::Number(if r == 0.0 { 0.0 } else { lhs.as_number() % r })
        }
        TokenKind::StarStar => Value::Number(lhs.as_number().powf(rhs.as_number())),
        TokenKind::Amp => Value::Number(((lhs.as_number() as i64) & (rhs.as_number() as i64)) as f64),
        TokenKind::Pipe => Value::Number(((lhs.as_number() as i64) | (rhs.as_number() as i64)) as f64),
        TokenKind::Caret => Value::Number(((lhs.as_number() as i64) ^ (rhs.as_number() as i64)) as f64),
        TokenKind::Shl => Value::Number(((lhs.as_number() as i64) << (rhs.as_number() as i64)) as f64),
        TokenKind::Shr => Value::Number(((lhs.as_number() as i64) >> (rhs.as_number() as i64)) as f64),
        TokenKind::EqEq => Value::Bool(lhs.loose_eq(rhs)),
        TokenKind::EqEqEq => Value::Bool(lhs.strict_eq(rhs)),
        TokenKind::NotEq => Value::Bool(!lhs.loose_eq(rhs)),
        TokenKind::NotEqEq => Value::Bool(!lhs.strict_eq(rhs)),
        TokenKind::Lt => Value::Bool(lhs.as_number() < rhs.as_number()),
        TokenKind::Gt => Value::Bool(lhs.as_number() > rhs.as_number()),
        TokenKind::LtEq => Value::Bool(lhs.as_number() <= rhs.as_number()),
        TokenKind::GtEq => Value::Bool(lhs.as_number() >= rhs.as_number()),
        TokenKind::AmpAmp => Value::Bool(lhs.is_truthy() && rhs.is_truthy()),
        TokenKind::PipePipe => Value::Bool(lhs.is_truthy() || rhs.is_truthy()),
        _ => Value::Null,
    }
}
