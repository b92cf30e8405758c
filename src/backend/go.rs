//! Go source emitter
//!
//! Accumulates translated fragments and required imports while the
//! parser runs, then assembles the final program text in one step.

/// Emits a Go translation unit
pub struct GoEmitter {
    /// Package clause name
    package: String,
    /// Required imports, deduplicated, insertion order preserved
    imports: Vec<String>,
    /// Accumulated body text
    code: String,
}

impl GoEmitter {
    pub fn new() -> Self {
        Self {
            package: "main".to_string(),
            imports: Vec::new(),
            code: String::new(),
        }
    }

    /// Append a raw fragment to the output buffer
    pub fn emit(&mut self, fragment: &str) {
        self.code.push_str(fragment);
    }

    /// Record a required import; repeated modules keep their first slot
    pub fn require_import(&mut self, module: &str) {
        if !self.imports.iter().any(|m| m == module) {
            self.imports.push(module.to_string());
        }
    }

    /// Assemble package clause, import block and accumulated body
    pub fn finalize(&self) -> String {
        let mut out = format!("package {}\n\n", self.package);
        if !self.imports.is_empty() {
            out.push_str("import (\n");
            for module in &self.imports {
                out.push_str(&format!("\t\"{}\"\n", module));
            }
            out.push_str(")\n\n");
        }
        out.push_str(&self.code);
        out
    }
}

impl Default for GoEmitter {
    fn default() -> Self {
        Self::new()
    }
}
