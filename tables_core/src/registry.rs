use crate::config::TableFileConfig;
use crate::drop::Drop;
use crate::table::DropTable;
use crate::{ConfigError, RollError};
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

static BUILTIN: OnceLock<DropTableRegistry> = OnceLock::new();

const BUILTIN_TABLES: [(&str, &str); 2] = [
    ("tables/normal.toml", include_str!("../tables/normal.toml")),
    ("tables/boss.toml", include_str!("../tables/boss.toml")),
];

/// Registry of all drop tables, loaded from TOML files
#[derive(Debug, Default)]
pub struct DropTableRegistry {
    tables: HashMap<String, DropTable>,
}

impl DropTableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The `normal` and `boss` tables shipped with the crate, parsed once
    pub fn builtin() -> &'static DropTableRegistry {
        BUILTIN.get_or_init(|| {
            let mut registry = Self::new();
            for (path, content) in BUILTIN_TABLES {
                registry
                    .load_str(content, Path::new(path))
                    .expect("built-in drop tables are valid");
            }
            registry
        })
    }

    /// Load all drop tables from a directory (recursively)
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_dir(dir)?;
        Ok(registry)
    }

    /// Load tables from a directory recursively
    fn load_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            let path = entry.path();

            if path.is_dir() {
                self.load_dir(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_file(&path)?;
            }
        }

        Ok(())
    }

    /// Load a single table file
    fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;
        self.load_str(&content, path)
    }

    /// Parse one table from TOML text; `path` labels errors
    pub fn load_str(&mut self, content: &str, path: &Path) -> Result<(), ConfigError> {
        let config: TableFileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.to_path_buf(),
        })?;

        let table = DropTable::from_config(config).map_err(|e| ConfigError::Validation {
            message: e.to_string(),
            path: path.to_path_buf(),
        })?;

        if self.tables.contains_key(&table.id) {
            tracing::warn!(table = %table.id, path = %path.display(), "drop table redefined");
        }
        self.tables.insert(table.id.clone(), table);
        Ok(())
    }

    /// Get a table by ID
    pub fn get(&self, id: &str) -> Option<&DropTable> {
        self.tables.get(id)
    }

    /// Check if a table exists
    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    /// List all table IDs
    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }

    /// Ids referenced by `table` entries that no loaded table defines
    pub fn dangling_references(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .tables
            .values()
            .flat_map(|table| table.nested_ids())
            .filter(|id| !self.contains(id))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Roll a table by ID
    pub fn roll<R: Rng + ?Sized>(
        &self,
        table_id: &str,
        rarity_mult: f64,
        gold_mult: f64,
        level: u32,
        rng: &mut R,
    ) -> Result<Vec<Drop>, RollError> {
        let table = self
            .get(table_id)
            .ok_or_else(|| RollError::UnknownTable(table_id.to_string()))?;

        table.roll(rarity_mult, gold_mult, level, rng, self, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_table(dir: &Path, name: &str, content: &str) {
        let path = dir.join(format!("{}.toml", name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_builtin_tables() {
        let registry = DropTableRegistry::builtin();
        assert!(registry.contains("normal"));
        assert!(registry.contains("boss"));
        assert!(registry.dangling_references().is_empty());
    }

    #[test]
    fn test_load_simple_table() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "test",
            r#"
[table]
id = "test"

[[entries]]
type = "no_drop"
weight = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        assert!(registry.contains("test"));
    }

    #[test]
    fn test_load_rejects_unknown_entry_type() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "bad",
            r#"
[table]
id = "bad"

[[entries]]
type = "currency"
weight = 100
"#,
        );

        let result = DropTableRegistry::load(dir.path());
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_roll_no_drop() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "empty",
            r#"
[table]
id = "empty"

[[entries]]
type = "no_drop"
weight = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();
        let drops = registry.roll("empty", 1.0, 1.0, 10, &mut rng).unwrap();
        assert!(drops.is_empty());
    }

    #[test]
    fn test_roll_equipment_and_stone() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "gear",
            r#"
[table]
id = "gear"

[[table.rolls]]
count = 2
weight = 1

[[entries]]
type = "equipment"
weight = 100
max_level = 10

[[entries]]
type = "stone"
weight = 100
min_level = 11
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();
        let low = registry.roll("gear", 1.0, 1.0, 5, &mut rng).unwrap();
        assert_eq!(low, vec![Drop::Equipment, Drop::Equipment]);
        let high = registry.roll("gear", 1.0, 1.0, 20, &mut rng).unwrap();
        assert_eq!(high, vec![Drop::Stone, Drop::Stone]);
    }

    #[test]
    fn test_roll_gold_scales_with_level() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "gold",
            r#"
[table]
id = "gold"

[[entries]]
type = "gold"
count = [10, 10]
per_level = 0.5
weight = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();
        let drops = registry.roll("gold", 1.0, 1.0, 10, &mut rng).unwrap();
        // 10 + floor(0.5 * 10)
        assert_eq!(drops, vec![Drop::Gold { amount: 15 }]);
    }

    #[test]
    fn test_nested_tables() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "inner",
            r#"
[table]
id = "inner"

[[entries]]
type = "gold"
count = 5
weight = 100
"#,
        );
        create_test_table(
            dir.path(),
            "outer",
            r#"
[table]
id = "outer"

[[entries]]
type = "table"
id = "inner"
weight = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();
        let drops = registry.roll("outer", 1.0, 1.0, 10, &mut rng).unwrap();
        assert_eq!(drops, vec![Drop::Gold { amount: 5 }]);
    }

    #[test]
    fn test_unknown_table_error() {
        let registry = DropTableRegistry::new();
        let mut rng = rand::thread_rng();
        let result = registry.roll("nonexistent", 1.0, 1.0, 10, &mut rng);
        assert!(matches!(result, Err(RollError::UnknownTable(_))));
    }

    #[test]
    fn test_dangling_reference_reported() {
        let mut registry = DropTableRegistry::new();
        registry
            .load_str(
                r#"
[table]
id = "outer"

[[entries]]
type = "table"
id = "missing"
weight = 1
"#,
                Path::new("outer.toml"),
            )
            .unwrap();
        assert_eq!(registry.dangling_references(), vec!["missing".to_string()]);
    }

    #[test]
    fn test_weighted_roll_count() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "weighted",
            r#"
[table]
id = "weighted"

[[table.rolls]]
count = 1
weight = 50

[[table.rolls]]
count = 2
weight = 50

[[entries]]
type = "gold"
count = 1
weight = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();

        // Over many iterations, should average ~1.5 drops
        let mut total = 0usize;
        let iterations = 10000;
        for _ in 0..iterations {
            let drops = registry.roll("weighted", 1.0, 1.0, 10, &mut rng).unwrap();
            total += drops.len();
        }

        let avg = total as f64 / iterations as f64;
        assert!(avg > 1.3 && avg < 1.7, "Average was {}", avg);
    }

    #[test]
    fn test_rarity_bonus() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "rarity",
            r#"
[table]
id = "rarity"

[[entries]]
type = "no_drop"
weight = 100
rarity_bonus = 0

[[entries]]
type = "stone"
weight = 1
rarity_bonus = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();

        let mut stones = 0;
        let iterations = 1000;
        for _ in 0..iterations {
            let drops = registry.roll("rarity", 10.0, 1.0, 10, &mut rng).unwrap();
            if drops.first() == Some(&Drop::Stone) {
                stones += 1;
            }
        }

        // 1 + 100 * 10 = 1001 for the stone vs 100 for nothing
        let pct = stones as f64 / iterations as f64;
        assert!(pct > 0.85, "Stone percentage was {}", pct);
    }

    #[test]
    fn test_gold_mult() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "gold",
            r#"
[table]
id = "gold"

[[entries]]
type = "gold"
count = [10, 10]
weight = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();

        let mut total = 0u64;
        let iterations = 1000;
        for _ in 0..iterations {
            let drops = registry.roll("gold", 1.0, 2.0, 10, &mut rng).unwrap();
            if let Some(Drop::Gold { amount }) = drops.first() {
                total += *amount as u64;
            }
        }

        let avg = total as f64 / iterations as f64;
        assert!((avg - 20.0).abs() < 1e-9, "Average was {}", avg);
    }

    #[test]
    fn test_cycle_detection() {
        let dir = TempDir::new().unwrap();
        // Table A references Table B, which references Table A
        create_test_table(
            dir.path(),
            "table_a",
            r#"
[table]
id = "table_a"

[[entries]]
type = "table"
id = "table_b"
weight = 100
"#,
        );
        create_test_table(
            dir.path(),
            "table_b",
            r#"
[table]
id = "table_b"

[[entries]]
type = "table"
id = "table_a"
weight = 100
"#,
        );

        let registry = DropTableRegistry::load(dir.path()).unwrap();
        let mut rng = rand::thread_rng();
        let result = registry.roll("table_a", 1.0, 1.0, 10, &mut rng);
        assert!(matches!(result, Err(RollError::CycleDetected(_))));
    }
}
