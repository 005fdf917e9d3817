use std::fmt;

/// One step of the conversion pipeline.
///
/// A pass rewrites the whole document it is given and must be total: any
/// input string produces an output string.
#[derive(Clone, Copy)]
pub struct Pass {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl Pass {
    pub const fn new(name: &'static str, apply: fn(&str) -> String) -> Self {
        Self { name, apply }
    }

    pub fn run(&self, text: &str) -> String {
        (self.apply)(text)
    }
}

impl fmt::Debug for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pass").field("name", &self.name).finish()
    }
}
