use unit::WorldPosition;

/// Marks a crafted item entity awaiting placement into the world by a
/// colonist, e.g. a built piece of furniture that has been crafted but not
/// yet carried to its destination. Feeds the build-goal hierarchy.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Packaged {
    pub target_pos: Option<WorldPosition>,
    pub being_carried: bool,
}
