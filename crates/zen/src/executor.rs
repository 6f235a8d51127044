//! Statement execution: dispatches on the leading token of each statement,
//! implements declarations, assignment, control flow, function definition,
//! and forwards host-capability statements.

use std::path::PathBuf;

use log::{debug, warn};

use crate::{
    cursor::{advance, capture_block, eat, kind_at},
    function::Function,
    host::{Fs as _, Graphics as _, HttpServer as _},
    interpreter::Interpreter,
    token::{Token, TokenKind},
    value::{ModuleValue, Value},
};

impl Interpreter {
    /// Executes statements from `*pos` until the matching `}` or until
    /// `is_returning` becomes true, consuming the closing brace either way.
    pub fn exec_block(&mut self, tokens: &[Token], pos: &mut usize) {
        while kind_at(tokens, *pos) != TokenKind::RBrace && kind_at(tokens, *pos) != TokenKind::Eof {
            if self.is_returning {
                break;
            }
            self.exec_statement(tokens, pos);
        }
        eat(tokens, pos, TokenKind::RBrace);
    }

    /// Executes one top-level statement sequence to completion (used by the
    /// driver/REPL, which has no enclosing braces to stop at).
    pub fn exec_program(&mut self, tokens: &[Token]) {
        let mut pos = 0;
        while kind_at(tokens, pos) != TokenKind::Eof {
            if self.is_returning {
                break;
            }
            self.exec_statement(tokens, &mut pos);
        }
    }

    fn exec_statement(&mut self, tokens: &[Token], pos: &mut usize) {
        match kind_at(tokens, *pos) {
            TokenKind::Let => self.exec_declaration(tokens, pos, false, false),
            TokenKind::Const => self.exec_declaration(tokens, pos, true, false),
            TokenKind::Var => self.exec_declaration(tokens, pos, false, true),
            TokenKind::Print => self.exec_print(tokens, pos),
            TokenKind::If => self.exec_if(tokens, pos),
            TokenKind::While => self.exec_while(tokens, pos),
            TokenKind::Func => self.exec_func_def(tokens, pos),
            TokenKind::Return => self.exec_return(tokens, pos),
            TokenKind::Import => self.exec_import(tokens, pos),
            TokenKind::Start => self.exec_start(tokens, pos),
            TokenKind::Stop => self.exec_stop(tokens, pos),
            TokenKind::Write => self.exec_write(tokens, pos),
            TokenKind::Delete => self.exec_delete(tokens, pos),
            TokenKind::Mkdir => self.exec_mkdir(tokens, pos),
            TokenKind::Clear => self.exec_clear(tokens, pos),
            TokenKind::Rect => self.exec_rect(tokens, pos),
            TokenKind::Circle => self.exec_circle(tokens, pos),
            TokenKind::Render => self.exec_render(tokens, pos),
            TokenKind::Ident => self.exec_ident_led(tokens, pos),
            TokenKind::Break | TokenKind::Continue => {
                // Recognised by the lexer but not wired into loop control (see SPEC_FULL.md §9).
                *pos += 1;
            }
            TokenKind::Eof | TokenKind::RBrace => {}
            _ => {
                // Expression statement; evaluate and discard.
                let _ = self.eval_expr(tokens, pos);
            }
        }
    }

    fn exec_declaration(&mut self, tokens: &[Token], pos: &mut usize, is_const: bool, _is_var: bool) {
        *pos += 1; // let/const/var
        let Some(name_tok) = advance(tokens, pos).cloned() else { return };
        if name_tok.kind != TokenKind::Ident {
            return;
        }
        eat(tokens, pos, TokenKind::Eq);
        let value = self.eval_expr(tokens, pos);
        self.env.declare(&name_tok.lexeme, value, is_const);
    }

    fn exec_print(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let mut first = true;
        if kind_at(tokens, *pos) != TokenKind::RParen {
            loop {
                let value = self.eval_expr(tokens, pos);
                if !first {
                    self.out.write_str(" ");
                }
                first = false;
                self.out.write_str(&value.to_string());
                if !eat(tokens, pos, TokenKind::Comma) {
                    break;
                }
            }
        }
        eat(tokens, pos, TokenKind::RParen);
        self.out.write_newline();
    }

    /// `if (cond) { ... } [elif (cond) { ... }]* [else { ... }]`.
    ///
    /// An `elif` is dispatched by recursing into this same function with the
    /// `elif` token treated as `if` (SPEC_FULL.md §4.6/§9) rather than by
    /// mutating the token stream in place, since function bodies replay a
    /// shared cloned token slice across calls.
    fn exec_if(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1; // if/elif
        let had_paren = eat(tokens, pos, TokenKind::LParen);
        let cond = self.eval_expr(tokens, pos);
        if had_paren {
            eat(tokens, pos, TokenKind::RParen);
        }

        if cond.is_truthy() {
            self.exec_block_braced(tokens, pos);
            self.skip_else_chain(tokens, pos);
            return;
        }

        capture_block(tokens, pos); // skip the untaken `if`/`elif` body
        match kind_at(tokens, *pos) {
            TokenKind::Elif => self.exec_if(tokens, pos),
            TokenKind::Else => {
                *pos += 1;
                self.exec_block_braced(tokens, pos);
            }
            _ => {}
        }
    }

    /// After a taken branch executes, skip any trailing `elif`/`else` arms.
    fn skip_else_chain(&mut self, tokens: &[Token], pos: &mut usize) {
        loop {
            match kind_at(tokens, *pos) {
                TokenKind::Elif => {
                    *pos += 1;
                    eat(tokens, pos, TokenKind::LParen);
                    self.skip_condition(tokens, pos);
                    eat(tokens, pos, TokenKind::RParen);
                    capture_block(tokens, pos);
                }
                TokenKind::Else => {
                    *pos += 1;
                    capture_block(tokens, pos);
                    break;
                }
                _ => break,
            }
        }
    }

    fn skip_condition(&mut self, tokens: &[Token], pos: &mut usize) {
        let _ = self.eval_expr(tokens, pos);
    }

    fn exec_block_braced(&mut self, tokens: &[Token], pos: &mut usize) {
        eat(tokens, pos, TokenKind::LBrace);
        self.exec_block(tokens, pos);
    }

    fn exec_while(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        let cond_pos = *pos;
        let had_paren = eat(tokens, pos, TokenKind::LParen);
        loop {
            let mut cursor = cond_pos;
            if had_paren {
                eat(tokens, &mut cursor, TokenKind::LParen);
            }
            let cond = self.eval_expr(tokens, &mut cursor);
            if had_paren {
                eat(tokens, &mut cursor, TokenKind::RParen);
            }
            if !cond.is_truthy() {
                *pos = cursor;
                capture_block(tokens, pos);
                break;
            }
            let mut body_pos = cursor;
            self.exec_block_braced(tokens, &mut body_pos);
            if self.is_returning {
                *pos = body_pos;
                break;
            }
        }
    }

    fn exec_func_def(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1; // func
        let Some(name_tok) = advance(tokens, pos).cloned() else { return };
        eat(tokens, pos, TokenKind::LParen);
        let mut params = Vec::new();
        if kind_at(tokens, *pos) != TokenKind::RParen {
            loop {
                if let Some(p) = advance(tokens, pos)
                    && p.kind == TokenKind::Ident
                {
                    params.push(p.lexeme.clone());
                }
                if !eat(tokens, pos, TokenKind::Comma) {
                    break;
                }
            }
        }
        eat(tokens, pos, TokenKind::RParen);
        let body = capture_block(tokens, pos).to_vec();
        self.register_function(Function::new(name_tok.lexeme, params, body));
    }

    fn exec_return(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        let value = if matches!(kind_at(tokens, *pos), TokenKind::RBrace | TokenKind::Eof) {
            Value::Null
        } else {
            self.eval_expr(tokens, pos)
        };
        self.return_val = value;
        self.is_returning = true;
    }

    fn exec_import(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        let Some(name_tok) = advance(tokens, pos).cloned() else { return };
        let name = name_tok.lexeme;
        let candidates = [self.config.module_path.join(format!("{name}.zt")), PathBuf::from(format!("{name}.zt"))];
        if let Some(found) = candidates.iter().find(|p| p.exists()) {
            debug!("zen::exec: resolved module '{name}' to {}", found.display());
            self.modules.insert(
                name.clone(),
                ModuleValue {
                    name: name.clone(),
                    exports: indexmap::IndexMap::new(),
                },
            );
            let module = self.modules.get(&name).cloned().unwrap();
            let _ = self.env.set(&name, Value::Module(module), false);
        } else {
            println!("Error: Module '{name}' not found");
            warn!("zen::exec: module '{name}' not found on search path");
        }
    }

    fn exec_start(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1; // start
        match kind_at(tokens, *pos) {
            TokenKind::Ident if tokens[*pos].lexeme == "http-server" => {
                *pos += 1;
                self.exec_start_http_server(tokens, pos);
            }
            TokenKind::Server => {
                *pos += 1;
                eat(tokens, pos, TokenKind::LParen);
                let port = self.eval_expr(tokens, pos).as_number() as u16;
                eat(tokens, pos, TokenKind::RParen);
                self.start_http_server(port, PathBuf::from("."));
            }
            _ => {}
        }
    }

    fn exec_start_http_server(&mut self, tokens: &[Token], pos: &mut usize) {
        let mut port = 8000u16;
        let mut root = PathBuf::from(".");
        while let TokenKind::Ident = kind_at(tokens, *pos) {
            let key = tokens[*pos].lexeme.clone();
            *pos += 1;
            eat(tokens, pos, TokenKind::Eq);
            let value = self.eval_expr(tokens, pos);
            match key.as_str() {
                "port" => port = value.as_number() as u16,
                "root" => root = PathBuf::from(value.to_string()),
                _ => {}
            }
        }
        self.start_http_server(port, root);
    }

    fn start_http_server(&mut self, port: u16, root: PathBuf) {
        if let Err(e) = self.host.http.start(port, root) {
            println!("Error: {e}");
            warn!("zen::host::http: {e}");
        }
    }

    fn exec_stop(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1; // stop
        eat(tokens, pos, TokenKind::Server);
        self.host.http.stop();
    }

    fn exec_write(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let path = self.eval_expr(tokens, pos).to_string();
        eat(tokens, pos, TokenKind::Comma);
        let content = self.eval_expr(tokens, pos).to_string();
        eat(tokens, pos, TokenKind::RParen);
        if let Err(e) = self.host.fs.write(&path, &content) {
            println!("Error: {e}");
            warn!("zen::host::fs: {e}");
        }
    }

    fn exec_delete(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let path = self.eval_expr(tokens, pos).to_string();
        eat(tokens, pos, TokenKind::RParen);
        if let Err(e) = self.host.fs.delete(&path) {
            println!("Error: {e}");
            warn!("zen::host::fs: {e}");
        }
    }

    fn exec_mkdir(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let path = self.eval_expr(tokens, pos).to_string();
        eat(tokens, pos, TokenKind::RParen);
        if let Err(e) = self.host.fs.mkdir(&path) {
            println!("Error: {e}");
            warn!("zen::host::fs: {e}");
        }
    }

    fn exec_clear(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let args = self.eval_arg_list(tokens, pos);
        eat(tokens, pos, TokenKind::RParen);
        let win = args.first().map(Value::as_number).unwrap_or(0.0) as u64;
        let [r, g, b] = rgb(&args, 1);
        self.host.graphics.clear(win, r, g, b);
    }

    fn exec_rect(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let args = self.eval_arg_list(tokens, pos);
        eat(tokens, pos, TokenKind::RParen);
        let win = args.first().map(Value::as_number).unwrap_or(0.0) as u64;
        let n = |i: usize| args.get(i).map(Value::as_number).unwrap_or(0.0) as i32;
        let [r, g, b] = rgb(&args, 5);
        let a = args.get(8).map(Value::as_number).unwrap_or(255.0) as u8;
        self.host.graphics.rect(win, n(1), n(2), n(3), n(4), r, g, b, a);
    }

    fn exec_circle(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let args = self.eval_arg_list(tokens, pos);
        eat(tokens, pos, TokenKind::RParen);
        let win = args.first().map(Value::as_number).unwrap_or(0.0) as u64;
        let n = |i: usize| args.get(i).map(Value::as_number).unwrap_or(0.0) as i32;
        let [r, g, b] = rgb(&args, 4);
        let a = args.get(7).map(Value::as_number).unwrap_or(255.0) as u8;
        self.host.graphics.circle(win, n(1), n(2), n(3), r, g, b, a);
    }

    fn exec_render(&mut self, tokens: &[Token], pos: &mut usize) {
        *pos += 1;
        eat(tokens, pos, TokenKind::LParen);
        let args = self.eval_arg_list(tokens, pos);
        eat(tokens, pos, TokenKind::RParen);
        let win = args.first().map(Value::as_number).unwrap_or(0.0) as u64;
        self.host.graphics.present(win);
    }

    fn eval_arg_list(&mut self, tokens: &[Token], pos: &mut usize) -> Vec<Value> {
        let mut args = Vec::new();
        if kind_at(tokens, *pos) != TokenKind::RParen {
            loop {
                args.push(self.eval_expr(tokens, pos));
                if !eat(tokens, pos, TokenKind::Comma) {
                    break;
                }
            }
        }
        args
    }

    /// IDENT-led statement: plain/compound assignment or indexed assignment.
    fn exec_ident_led(&mut self, tokens: &[Token], pos: &mut usize) {
        let name = tokens[*pos].lexeme.clone();
        let start = *pos;
        *pos += 1;

        if kind_at(tokens, *pos) == TokenKind::LBracket {
            *pos += 1;
            let index = self.eval_expr(tokens, pos);
            eat(tokens, pos, TokenKind::RBracket);
            if eat(tokens, pos, TokenKind::Eq) {
                let value = self.eval_expr(tokens, pos);
                self.index_assign(&name, index, value);
                return;
            }
            // Not an assignment after all (e.g. an indexing expression statement).
            *pos = start;
            let _ = self.eval_expr(tokens, pos);
            return;
        }

        let op = kind_at(tokens, *pos);
        if matches!(
            op,
            TokenKind::Eq | TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq
        ) {
            *pos += 1;
            let rhs = self.eval_expr(tokens, pos);
            let new_value = match op {
                TokenKind::Eq => rhs,
                TokenKind::PlusEq => {
                    let current = self.env.get(&name).cloned().unwrap_or(Value::Null);
                    if let Value::String(s) = &current {
                        Value::String(format!("{s}{rhs}"))
                    } else {
                        Value::Number(current.as_number() + rhs.as_number())
                    }
                }
                TokenKind::MinusEq => {
                    let current = self.env.get(&name).cloned().unwrap_or(Value::Null);
                    Value::Number(current.as_number() - rhs.as_number())
                }
                TokenKind::StarEq => {
                    let current = self.env.get(&name).cloned().unwrap_or(Value::Null);
                    Value::Number(current.as_number() * rhs.as_number())
                }
                TokenKind::SlashEq => {
                    let current = self.env.get(&name).cloned().unwrap_or(Value::Null);
                    let r = rhs.as_number();
                    Value::Number(if r == 0.0 { 0.0 } else { current.as_number() / r })
                }
                _ => unreachable!(),
            };
            if self.env.set(&name, new_value, false).is_err() {
                println!("Error: Cannot reassign constant '{name}'");
            }
            return;
        }

        // Not an assignment: this was an expression statement starting with an
        // identifier (a bare call, a post-increment, ...).
        *pos = start;
        let _ = self.eval_expr(tokens, pos);
    }

    fn index_assign(&mut self, name: &str, index: Value, value: Value) {
        match self.env.get(name).cloned() {
            Some(Value::Array(mut items)) => {
                let i = index.as_number();
                if i >= 0.0 && (i as usize) < items.len() {
                    items[i as usize] = value;
                    let _ = self.env.set(name, Value::Array(items), false);
                }
            }
            Some(Value::Dict(mut map)) => {
                map.insert(index.to_string(), value);
                let _ = self.env.set(name, Value::Dict(map), false);
            }
            _ => {}
        }
    }
}

fn rgb(args: &[Value], offset: usize) -> [u8; 3] {
    let n = |i: usize| args.get(offset + i).map(Value::as_number).unwrap_or(0.0) as u8;
    [n(0), n(1), n(2)]
}
