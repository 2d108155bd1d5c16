//! Alias store: at most one value per name, listed in declaration order.

/// One `name -> command line` rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`, overwriting an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.entries.push(Alias { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|a| a.name != name);
        self.entries.len() != before
    }

    pub fn all(&self) -> &[Alias] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
