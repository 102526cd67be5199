use std::collections::HashMap;

use crate::abi::{ARG, KBD, LCL, SCREEN, SP, THAT, THIS, VARIABLE_BASE};
use crate::{Error, Result};

/// Symbol → address map used by the assembler.
///
/// Starts out with the platform's predefined symbols. Labels bind ROM
/// addresses; any other symbol becomes a variable at the next free RAM cell
/// from [`VARIABLE_BASE`] upward.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, u16>,
    next_variable: u16,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        let mut symbols = HashMap::new();
        for (name, address) in [
            ("SP", SP),
            ("LCL", LCL),
            ("ARG", ARG),
            ("THIS", THIS),
            ("THAT", THAT),
            ("SCREEN", SCREEN),
            ("KBD", KBD),
        ] {
            symbols.insert(name.to_string(), address);
        }
        for r in 0..16u16 {
            symbols.insert(format!("R{r}"), r);
        }
        Self {
            symbols,
            next_variable: VARIABLE_BASE,
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    /// Bind a label to a ROM address. Redefinition is an error, including
    /// redefinition of a predefined symbol.
    pub fn define_label(&mut self, name: &str, address: u16) -> Result<()> {
        if let Some(&existing) = self.symbols.get(name) {
            return Err(Error::DuplicateLabel {
                label: name.to_string(),
                address: existing,
            });
        }
        self.symbols.insert(name.to_string(), address);
        Ok(())
    }

    /// Address of `name`, allocating a new variable on first use.
    pub fn resolve_or_allocate(&mut self, name: &str) -> u16 {
        if let Some(address) = self.get(name) {
            return address;
        }
        let address = self.next_variable;
        self.next_variable += 1;
        tracing::trace!(symbol = name, address, "allocated variable");
        self.symbols.insert(name.to_string(), address);
        address
    }

    /// Number of variables allocated so far.
    #[must_use]
    pub fn variables(&self) -> u16 {
        self.next_variable - VARIABLE_BASE
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_symbols() {
        let table = SymbolTable::new();
        assert_eq!(table.get("SP"), Some(0));
        assert_eq!(table.get("THAT"), Some(4));
        assert_eq!(table.get("R13"), Some(13));
        assert_eq!(table.get("R15"), Some(15));
        assert_eq!(table.get("SCREEN"), Some(16384));
        assert_eq!(table.get("KBD"), Some(24576));
        assert_eq!(table.get("R16"), None);
    }

    #[test]
    fn test_variables_allocated_in_first_use_order() {
        let mut table = SymbolTable::new();
        assert_eq!(table.resolve_or_allocate("i"), 16);
        assert_eq!(table.resolve_or_allocate("Main.0"), 17);
        assert_eq!(table.resolve_or_allocate("i"), 16);
        assert_eq!(table.resolve_or_allocate("R2"), 2);
        assert_eq!(table.variables(), 2);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut table = SymbolTable::new();
        table.define_label("LOOP", 4).unwrap();
        assert!(matches!(
            table.define_label("LOOP", 9),
            Err(Error::DuplicateLabel { address: 4, .. })
        ));
        assert!(table.define_label("SP", 9).is_err());
    }
}
