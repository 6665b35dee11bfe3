use crate::scanner::directory_walker::{sorted_records, FileRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestGroup {
    pub name: String,
    pub files: Vec<String>,
}

impl ManifestGroup {
    pub fn new<S: Into<String>>(name: S, files: &[&str]) -> Self {
        Self {
            name: name.into(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Ordered groups of project-relative paths to combine. List order is
/// authoritative; nothing here is sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileManifest {
    pub groups: Vec<ManifestGroup>,
}

impl Default for FileManifest {
    fn default() -> Self {
        Self::new(vec![
            ManifestGroup::new(
                "root",
                &[
                    ".env.local",
                    ".gitignore",
                    "components.json",
                    "eslint.config.mjs",
                    "Handoff.md",
                    "middleware.ts",
                    "next-env.d.ts",
                    "next.config.ts",
                    "package-lock.json",
                    "package.json",
                    "postcss.config.js",
                    "postcss.config.mjs",
                    "README.md",
                    "tailwind.config.js",
                    "tsconfig.json",
                    "vercel.json",
                ],
            ),
            ManifestGroup::new(
                "app",
                &[
                    "app/admin/login/page.tsx",
                    "app/admin/page.tsx",
                    "app/api/events/[id]/route.ts",
                    "app/api/events/route.ts",
                    "app/api/test-auth/route.ts",
                    "app/api/test-db/route.ts",
                    "app/globals.css",
                    "app/layout.tsx",
                    "app/page.tsx",
                    "app/test-events/page.tsx",
                ],
            ),
            ManifestGroup::new(
                "components",
                &[
                    "components/event-card.tsx",
                    "components/training-filter.tsx",
                    "components/ui/button.tsx",
                    "components/ui/card.tsx",
                    "components/ui/dialog.tsx",
                    "components/ui/language-toggle.tsx",
                    "components/ui/logo-header.tsx",
                ],
            ),
            ManifestGroup::new(
                "lib",
                &[
                    "lib/auth-simple.ts",
                    "lib/constants.ts",
                    "lib/db/redis-client.ts",
                    "lib/db/seed.ts",
                    "lib/hooks/useEventFilter.ts",
                    "lib/i18n/translations.ts",
                    "lib/i18n/useTranslation.ts",
                    "lib/sample-data-generator.ts",
                    "lib/sample-data.ts",
                    "lib/types.ts",
                    "lib/utils.ts",
                ],
            ),
        ])
    }
}

impl FileManifest {
    pub fn new(groups: Vec<ManifestGroup>) -> Self {
        Self { groups }
    }

    /// Builds a manifest from a directory walk so the combined dump tracks the
    /// files actually on disk. Groups follow `group_order`, paths use `/`.
    pub fn from_records(records: &[FileRecord], group_order: &[String]) -> Self {
        let mut groups: Vec<ManifestGroup> = Vec::new();

        for record in sorted_records(records, group_order) {
            let path = record.relative_path.replace('\\', "/");
            match groups.last_mut() {
                Some(group) if group.name == record.directory_group => group.files.push(path),
                _ => groups.push(ManifestGroup {
                    name: record.directory_group.clone(),
                    files: vec![path],
                }),
            }
        }

        Self { groups }
    }

    pub fn total_files(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_files() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::SystemTime;

    #[test]
    fn test_default_manifest_layout() {
        let manifest = FileManifest::default();
        let names: Vec<&str> = manifest.groups.iter().map(|g| g.name.as_str()).collect();

        assert_eq!(names, vec!["root", "app", "components", "lib"]);
        assert_eq!(manifest.total_files(), 16 + 10 + 7 + 11);
        assert_eq!(manifest.groups[1].files[2], "app/api/events/[id]/route.ts");
    }

    #[test]
    fn test_manifest_from_records() {
        let make = |rel: &str, group: &str| {
            FileRecord::new(
                PathBuf::from(rel),
                Path::new(rel),
                group,
                1,
                SystemTime::UNIX_EPOCH,
            )
        };
        let records = vec![
            make("lib/utils.ts", "lib"),
            make("app/page.tsx", "app"),
            make("package.json", "root"),
            make("app/Admin/page.tsx", "app"),
        ];
        let order: Vec<String> = ["root", "app", "components", "lib"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let manifest = FileManifest::from_records(&records, &order);

        assert_eq!(
            manifest.groups,
            vec![
                ManifestGroup::new("root", &["package.json"]),
                ManifestGroup::new("app", &["app/Admin/page.tsx", "app/page.tsx"]),
                ManifestGroup::new("lib", &["lib/utils.ts"]),
            ]
        );
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = FileManifest::from_records(&[], &["root".to_string()]);
        assert!(manifest.is_empty());
    }
}
