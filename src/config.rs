use crate::inject::Injector;
use crate::smali::{Payload, SlotCounting};

/// Library loaded when none is named, i.e. `libfrida-gadget.so`
pub const DEFAULT_LIB_NAME: &str = "frida-gadget";
/// attachBaseContext, then <clinit>, then onCreate
pub const DEFAULT_FALLBACK_ORDER: [u8; 3] = [1, 2, 3];

#[derive(Clone, Debug)]
pub struct Config {
    /// Name handed to `System.loadLibrary`.
    pub lib_name: String,
    /// Fallback levels to try, in order. Kept as raw numbers so invalid
    /// levels are reported by the injector rather than dropped here.
    pub levels: Vec<u8>,
    /// How `J`/`D` parameters are counted when budgeting registers.
    pub slot_counting: SlotCounting,
    /// Class to resolve when the target is a disassembly directory.
    pub class_name: Option<String>,
    /// Run the injector without writing the unit back.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lib_name: DEFAULT_LIB_NAME.to_string(),
            levels: DEFAULT_FALLBACK_ORDER.to_vec(),
            slot_counting: SlotCounting::Observed,
            class_name: None,
            dry_run: false,
        }
    }
}

impl Config {
    pub fn injector(&self) -> Injector {
        Injector::new(Payload::new(self.lib_name.clone()), self.slot_counting)
    }
}
