//! Code synthesis: the generated declarations for every definition block,
//! spliced into the residual text at each definition's origin.
//!
//! Generated code still uses accessor shorthand (`Vec3.x(SELF)`); the macro
//! pass lowers it to memory operations afterwards.

use flat_diagnostic::{CompileError, CompileResult};
use flat_parse::{ParsedFile, SELF};
use flat_types::{Method, MethodKind, Session, UserDefn, Virtual};

use crate::lines::LineMap;
use crate::self_access::expand_body;

/// Pasted-up text and the source line of every position in it.
#[derive(Clone, Debug)]
pub struct Pasted {
    pub text: String,
    pub lines: LineMap,
}

impl Pasted {
    /// Text with no generated code, starting at line 1.
    pub fn plain(text: impl Into<String>) -> Self {
        Pasted {
            text: text.into(),
            lines: LineMap::new(),
        }
    }
}

/// The residual text of `parsed` with generated code for each of its
/// definitions inserted at their origins.
pub fn paste_up(session: &Session, parsed: &ParsedFile) -> CompileResult<Pasted> {
    let residual = parsed.residual.as_str();
    let mut out = String::with_capacity(residual.len() * 2);
    let mut lines = LineMap::new();
    lines.source_from(0, parsed.residual_line(0));
    let mut cursor = 0;
    let mut pasted = false;
    for parsed_defn in &parsed.defs {
        let id = session.lookup(&parsed_defn.name).ok_or_else(|| {
            CompileError::internal(format!("`{}` was never registered", parsed_defn.name))
        })?;
        let defn = session.user(id)?;
        let origin = parsed_defn.origin;
        let Some(before) = residual.get(cursor..origin) else {
            return Err(CompileError::internal(format!(
                "origin {origin} of `{}` is outside the residual text",
                defn.name
            )));
        };
        out.push_str(before);
        if pasted && origin == cursor {
            out.push('\n');
        }
        let code = synthesize(session, defn)?;
        lines.splice(out.len(), &code.lines);
        out.push_str(&code.text);
        lines.source_from(out.len(), parsed.residual_line(origin));
        cursor = origin;
        pasted = true;
    }
    out.push_str(&residual[cursor..]);
    Ok(Pasted { text: out, lines })
}

/// All generated code for one type, without a trailing newline.
pub fn generate(session: &Session, defn: &UserDefn) -> CompileResult<String> {
    synthesize(session, defn).map(|code| code.text)
}

fn synthesize(session: &Session, defn: &UserDefn) -> CompileResult<Code> {
    let mut code = Code::new(defn.line);
    if defn.is_class() {
        class(session, defn, &mut code)?;
    } else {
        structure(session, defn, &mut code)?;
    }
    tracing::debug!(
        type_name = %defn.name,
        lines = code.count,
        "generated definition"
    );
    Ok(code)
}

/// Generated lines. Method bodies keep their source lines; everything
/// else is reported on the definition's line.
struct Code {
    text: String,
    lines: LineMap,
    count: usize,
    defn_line: u32,
}

impl Code {
    fn new(defn_line: u32) -> Self {
        Code {
            text: String::new(),
            lines: LineMap::fixed(defn_line),
            count: 0,
            defn_line,
        }
    }

    fn start_line(&mut self) {
        if self.count > 0 {
            self.text.push('\n');
        }
        self.count += 1;
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.start_line();
        self.text.push_str(text.as_ref());
    }

    /// `Owner.name = function (SELF, params) {body};`
    fn function(&mut self, target: &str, method: &Method, body: &str) {
        self.start_line();
        self.text.push_str(&format!(
            "{target} = function ({}) ",
            parameters(&method.signature)
        ));
        self.lines.source_from(self.text.len(), method.line);
        self.text.push_str(&braced(body));
        self.text.push(';');
        self.lines.fixed_from(self.text.len(), self.defn_line);
    }
}

/// `SELF` followed by `params`.
fn parameters(params: &[String]) -> String {
    let mut list = String::from(SELF);
    for param in params {
        list.push_str(", ");
        list.push_str(param);
    }
    list
}

/// A method body back in braces, with trailing blank lines dropped from
/// multi-line bodies.
fn braced(body: &str) -> String {
    if body.contains('\n') {
        format!("{{{}\n}}", body.trim_end())
    } else {
        format!("{{{body}}}")
    }
}

// ─── Structs ────────────────────────────────────────────────────────

fn structure(session: &Session, defn: &UserDefn, code: &mut Code) -> CompileResult<()> {
    let name = &defn.name;
    code.line(format!("function {name}() {{}}"));
    metadata(defn, code);

    let getter = find(defn, MethodKind::Get);
    let setter = find(defn, MethodKind::Set);

    match getter {
        Some(method) => {
            let body = expand_body(session, defn, method)?;
            code.function(&format!("{name}._get_impl"), method, &body);
        }
        None => {
            code.line(format!("{name}._get_impl = function ({SELF}) {{"));
            code.line(format!("  var v = new {name}();"));
            for prop in &defn.props {
                code.line(format!("  v.{0} = {name}.{0}({SELF});", prop.name));
            }
            code.line("  return v;");
            code.line("};");
        }
    }

    match setter {
        Some(method) => {
            let body = expand_body(session, defn, method)?;
            code.function(&format!("{name}._set_impl"), method, &body);
        }
        None => {
            code.line(format!("{name}._set_impl = function ({SELF}, v) {{"));
            for prop in &defn.props {
                code.line(format!("  {name}.{0}.set({SELF}, v.{0});", prop.name));
            }
            code.line("};");
        }
    }
    Ok(())
}

fn find(defn: &UserDefn, kind: MethodKind) -> Option<&Method> {
    defn.methods.iter().find(|m| m.kind == kind)
}

fn metadata(defn: &UserDefn, code: &mut Code) {
    let name = &defn.name;
    code.line(format!("{name}.NAME = \"{name}\";"));
    code.line(format!("{name}.SIZE = {};", defn.size));
    code.line(format!("{name}.ALIGN = {};", defn.align));
}

// ─── Classes ────────────────────────────────────────────────────────

fn class(session: &Session, defn: &UserDefn, code: &mut Code) -> CompileResult<()> {
    let name = &defn.name;
    let info = defn
        .class()
        .ok_or_else(|| CompileError::internal(format!("`{name}` is not a class")))?;
    let base = match defn.base() {
        Some(id) => Some(session.user(id)?.name.as_str()),
        None => None,
    };
    let id = info.class_id;

    code.line(format!("function {name}(p) {{ this._pointer = (p|0); }}"));
    if let Some(base) = base {
        code.line(format!("{name}.prototype = Object.create({base}.prototype);"));
        code.line(format!("{name}.prototype.constructor = {name};"));
    }
    code.line(format!(
        "Object.defineProperty({name}.prototype, \"pointer\", \
         {{ get: function () {{ return this._pointer; }} }});"
    ));
    metadata(defn, code);
    code.line(format!("{name}.CLSID = {id};"));
    code.line(format!(
        "Object.defineProperty({name}, \"BASE\", {{ get: function () {{ return {}; }} }});",
        base.unwrap_or("null")
    ));
    code.line(format!(
        "{name}.initInstance = function ({SELF}) {{ _mem_int32[{SELF} >> 2] = {id}; return {SELF}; }};"
    ));
    code.line(format!("FlatJS._idToType[{id}] = {name};"));

    for method in &defn.methods {
        let body = expand_body(session, defn, method)?;
        let target = match method.kind {
            MethodKind::Virtual => flat_types::impl_name(name, &method.name),
            _ => format!("{name}.{}", method.name),
        };
        code.function(&target, method, &body);
    }

    for entry in &info.vtable {
        dispatcher(name, entry, code);
    }
    Ok(())
}

/// `T.m`: a switch on the type tag selecting the implementation.
fn dispatcher(type_name: &str, entry: &Virtual, code: &mut Code) {
    let params = parameters(&entry.signature);
    code.line(format!(
        "{type_name}.{} = function ({params}) {{",
        entry.name
    ));
    code.line(format!("  switch (_mem_int32[{SELF} >> 2]) {{"));
    for (implementation, ids) in &entry.reverse_cases {
        for id in ids {
            code.line(format!("    case {id}:"));
        }
        code.line(format!("      return {implementation}({params});"));
    }
    code.line("    default:");
    match &entry.default {
        Some(implementation) => code.line(format!("      return {implementation}({params});")),
        None => code.line(format!("      throw FlatJS._badType({SELF});")),
    }
    code.line("  }");
    code.line("};");
}
