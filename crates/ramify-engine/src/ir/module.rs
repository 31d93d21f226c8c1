//! IR Module
//!
//! Top-level container for lowered functions.

use super::function::IrFunction;
use rustc_hash::FxHashMap;

/// An IR module (compilation unit)
#[derive(Debug, Clone, Default)]
pub struct IrModule {
    /// Functions in definition order
    pub functions: Vec<IrFunction>,
    /// Function lookup by name
    function_map: FxHashMap<String, usize>,
}

impl IrModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function; a later function with the same name shadows the earlier
    /// one for lookup purposes but both are kept and printed
    pub fn add_function(&mut self, func: IrFunction) -> usize {
        let index = self.functions.len();
        self.function_map.insert(func.name.clone(), index);
        self.functions.push(func);
        index
    }

    pub fn get_function(&self, index: usize) -> Option<&IrFunction> {
        self.functions.get(index)
    }

    pub fn get_function_by_name(&self, name: &str) -> Option<&IrFunction> {
        self.function_map
            .get(name)
            .and_then(|&index| self.get_function(index))
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::block::Region;

    #[test]
    fn test_module_lookup() {
        let mut module = IrModule::new();
        module.add_function(IrFunction::new("a", vec![], Region::new()));
        module.add_function(IrFunction::new("b", vec![], Region::new()));

        assert_eq!(module.function_count(), 2);
        assert_eq!(module.get_function_by_name("b").map(|f| f.name.as_str()), Some("b"));
        assert!(module.get_function_by_name("c").is_none());
    }
}
