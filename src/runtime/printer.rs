//! Rendering of values back to source-like text

use std::collections::HashSet;

use crate::runtime::stack;
use crate::runtime::value::PairRef;
use crate::runtime::Value;

/// Readable rendering: strings are quoted and escaped, so the output reads back
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    Printer::new(true).write(&mut out, value);
    out
}

/// Plain rendering: strings are written raw (as `princ` does)
pub fn render_plain(value: &Value) -> String {
    let mut out = String::new();
    Printer::new(false).write(&mut out, value);
    out
}

/// Renders a number; integral values print without a fractional part
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Escapes a string for readable output, including the surrounding quotes
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Printer {
    readable: bool,
    // Pairs on the path from the root to the current position
    path: HashSet<usize>,
}

impl Printer {
    fn new(readable: bool) -> Self {
        Printer {
            readable,
            path: HashSet::new(),
        }
    }

    fn write(&mut self, out: &mut String, value: &Value) {
        match value {
            Value::Symbol(sym) => out.push_str(sym.name()),
            Value::String(s) if self.readable => out.push_str(&escape_string(s)),
            Value::String(s) => out.push_str(s),
            Value::Number(n) => out.push_str(&format_number(*n)),
            Value::Closure(closure) => {
                out.push_str("#<closure ");
                out.push_str(closure.display_name());
                out.push('>');
            }
            Value::Pair(pair) => stack::guarded(|| self.write_list(out, pair)),
        }
    }

    fn write_list(&mut self, out: &mut String, first: &PairRef) {
        if self.path.contains(&first.addr()) {
            out.push_str("...");
            return;
        }

        let mut entered = vec![first.addr()];
        self.path.insert(first.addr());
        out.push('(');
        self.write(out, &first.head());

        let mut tail = first.tail();
        loop {
            match tail {
                Value::Pair(next) => {
                    if self.path.contains(&next.addr()) {
                        out.push_str(" . ...");
                        break;
                    }
                    entered.push(next.addr());
                    self.path.insert(next.addr());
                    out.push(' ');
                    self.write(out, &next.head());
                    tail = next.tail();
                }
                ref end if end.is_nil() => break,
                other => {
                    out.push_str(" . ");
                    self.write(out, &other);
                    break;
                }
            }
        }
        out.push(')');

        for addr in entered {
            self.path.remove(&addr);
        }
    }
}
