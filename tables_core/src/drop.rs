/// Result of rolling a drop table, before realization by a generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drop {
    /// A piece of equipment to generate at the kill's level
    Equipment,
    /// A stone to generate at the kill's level
    Stone,
    /// Gold, already scaled by level and gold find
    Gold { amount: u32 },
}
