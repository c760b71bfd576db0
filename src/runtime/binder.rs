//! Parameter lists and argument binding for closures and macros

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::environment::Frame;
use crate::runtime::{LispEvaluator, Value};

/// Lambda-list keyword introducing optional parameters
pub const OPTIONAL_MARKER: &str = "&optional";
/// Lambda-list keyword introducing the rest parameter
pub const REST_MARKER: &str = "&rest";

/// An `&optional` parameter with its unevaluated default form
#[derive(Debug, Clone)]
pub struct OptionalParam {
    /// Parameter name
    pub name: Rc<str>,
    /// Default form, evaluated when no argument is supplied
    pub default: Option<Value>,
}

/// Parsed parameter list: required names, `&optional` group, `&rest` name
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    /// Ordinary positional parameters
    pub required: Vec<Rc<str>>,
    /// Parameters following `&optional`
    pub optional: Vec<OptionalParam>,
    /// Name following `&rest`
    pub rest: Option<Rc<str>>,
}

#[derive(PartialEq)]
enum Section {
    Required,
    Optional,
    Rest,
    Done,
}

impl ParamList {
    /// Parses a parameter list form such as `(a b &optional (c 1) &rest more)`
    pub fn parse(form: &Value) -> Result<Self> {
        let items = form
            .to_vec()
            .map_err(|_| Error::malformed(format!("parameter list must be a list, got {}", form)))?;

        let mut params = ParamList::default();
        let mut section = Section::Required;

        for item in &items {
            match item {
                Value::Symbol(sym) if sym.name() == OPTIONAL_MARKER => {
                    if section != Section::Required {
                        return Err(Error::malformed("misplaced &optional"));
                    }
                    section = Section::Optional;
                }
                Value::Symbol(sym) if sym.name() == REST_MARKER => {
                    if section == Section::Rest || section == Section::Done {
                        return Err(Error::malformed("only one &rest parameter allowed"));
                    }
                    section = Section::Rest;
                }
                Value::Symbol(_) => {
                    let name = param_name(item)?;
                    match section {
                        Section::Required => params.required.push(name),
                        Section::Optional => params.optional.push(OptionalParam {
                            name,
                            default: None,
                        }),
                        Section::Rest => {
                            params.rest = Some(name);
                            section = Section::Done;
                        }
                        Section::Done => {
                            return Err(Error::malformed(format!(
                                "parameter {} after &rest name",
                                item
                            )))
                        }
                    }
                }
                Value::Pair(_) if section == Section::Optional => {
                    let spec = item.to_vec()?;
                    if spec.is_empty() || spec.len() > 2 {
                        return Err(Error::malformed(format!(
                            "optional parameter must be (name default), got {}",
                            item
                        )));
                    }
                    params.optional.push(OptionalParam {
                        name: param_name(&spec[0])?,
                        default: spec.get(1).cloned(),
                    });
                }
                other => {
                    return Err(Error::malformed(format!(
                        "parameter must be a symbol, got {}",
                        other
                    )))
                }
            }
        }

        if section == Section::Rest {
            return Err(Error::malformed("&rest without a parameter name"));
        }
        Ok(params)
    }

    /// Minimum number of arguments
    pub fn min_args(&self) -> usize {
        self.required.len()
    }

    /// Maximum number of arguments; `None` when a rest parameter is present
    pub fn max_args(&self) -> Option<usize> {
        match self.rest {
            Some(_) => None,
            None => Some(self.required.len() + self.optional.len()),
        }
    }

    /// Human-readable expected argument count
    pub fn expected(&self) -> String {
        let min = self.min_args();
        match self.max_args() {
            Some(max) if max == min => format!("exactly {}", min),
            Some(max) => format!("between {} and {}", min, max),
            None => format!("at least {}", min),
        }
    }

    /// All parameter names in binding order
    pub fn names(&self) -> impl Iterator<Item = &Rc<str>> {
        self.required
            .iter()
            .chain(self.optional.iter().map(|p| &p.name))
            .chain(self.rest.iter())
    }
}

fn param_name(value: &Value) -> Result<Rc<str>> {
    let sym = value
        .as_symbol()
        .ok_or_else(|| Error::malformed(format!("parameter must be a symbol, got {}", value)))?;
    if sym.is_constant() {
        return Err(Error::ConstantAssignment {
            name: sym.name().to_string(),
        });
    }
    Ok(sym.name_rc())
}

/// Splits a leading `(declare ...)` form off a body.
///
/// Returns the names listed in `(special ...)` declaration specifiers and
/// the remaining body forms. Other specifiers are ignored.
pub fn split_declarations(body: &[Value]) -> Result<(Vec<Rc<str>>, &[Value])> {
    let Some(first) = body.first() else {
        return Ok((Vec::new(), body));
    };
    let is_declare = first
        .as_pair()
        .map(|pair| pair.head().is_symbol_named("declare"))
        .unwrap_or(false);
    if !is_declare {
        return Ok((Vec::new(), body));
    }

    let mut specials = Vec::new();
    for spec in first.cdr()?.to_vec()? {
        let parts = spec.to_vec()?;
        if parts.first().map(|p| p.is_symbol_named("special")) != Some(true) {
            continue;
        }
        for name in &parts[1..] {
            let sym = name.expect_symbol("symbol in special declaration")?;
            specials.push(sym.name_rc());
        }
    }
    Ok((specials, &body[1..]))
}

/// Binds `args` to `params` in `frame`, which must be the innermost active frame.
///
/// Optional defaults are evaluated after earlier parameters are bound, so
/// they may refer to them. Names in `specials` are then promoted into the
/// frame's dynamics map.
pub fn bind_arguments(
    eval: &mut LispEvaluator,
    frame: &Frame,
    callee: &str,
    params: &ParamList,
    specials: &[Rc<str>],
    args: Vec<Value>,
) -> Result<()> {
    let given = args.len();
    let too_many = params.max_args().map(|max| given > max).unwrap_or(false);
    if given < params.min_args() || too_many {
        return Err(Error::ArityError {
            name: callee.to_string(),
            expected: params.expected(),
            got: given,
        });
    }

    let mut args = args.into_iter();
    for name in &params.required {
        // Count checked above
        let value = args.next().unwrap_or_else(Value::nil);
        frame.bind(name, value);
    }
    for param in &params.optional {
        let value = match args.next() {
            Some(value) => value,
            None => match &param.default {
                Some(form) => eval.eval(form)?,
                None => Value::nil(),
            },
        };
        frame.bind(&param.name, value);
    }
    if let Some(rest) = &params.rest {
        frame.bind(rest, Value::list(args));
    }

    for name in specials {
        frame.promote_special(name);
    }
    Ok(())
}
