use assets::DefNameId;

/// Read-only hint for [`crate::render_extraction`]; the simulation core
/// never touches a renderer itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Appearance {
    pub def_name: DefNameId,
    pub scale: f32,
    pub rgba: [f32; 4],
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            def_name: DefNameId::INVALID,
            scale: 1.0,
            rgba: [1.0, 1.0, 1.0, 1.0],
        }
    }
}
