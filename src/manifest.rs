// src/manifest.rs
//! `package.json` migration: Next.js packages out, Vite and React Router in.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::ManifestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Dependencies,
    DevDependencies,
}

impl Section {
    const ALL: [Section; 2] = [Section::Dependencies, Section::DevDependencies];

    pub fn key(self) -> &'static str {
        match self {
            Section::Dependencies => "dependencies",
            Section::DevDependencies => "devDependencies",
        }
    }
}

const SCRIPTS: &str = "scripts";

struct NextPackage {
    name: &'static str,
    replacement: Option<(&'static str, &'static str)>,
    note: Option<&'static str>,
}

const NEXT_PACKAGES: &[NextPackage] = &[
    NextPackage { name: "next", replacement: None, note: None },
    NextPackage {
        name: "next-seo",
        replacement: None,
        note: Some("next-seo removed; move SEO tags into <Helmet> elements"),
    },
    NextPackage {
        name: "next-i18next",
        replacement: Some(("react-i18next", "^14.1.0")),
        note: Some("next-i18next replaced by react-i18next; i18n config must be ported by hand"),
    },
    NextPackage {
        name: "next-pwa",
        replacement: Some(("vite-plugin-pwa", "^0.20.0")),
        note: None,
    },
    NextPackage {
        name: "next-auth",
        replacement: None,
        note: Some("next-auth removed; authentication needs a client-side replacement"),
    },
    NextPackage {
        name: "@next/font",
        replacement: None,
        note: Some("@next/font removed; load fonts from CSS instead"),
    },
    NextPackage {
        name: "@next/bundle-analyzer",
        replacement: Some(("rollup-plugin-visualizer", "^5.12.0")),
        note: None,
    },
    NextPackage {
        name: "eslint-config-next",
        replacement: Some(("eslint-plugin-react-hooks", "^4.6.2")),
        note: None,
    },
];

const ADDITIONS: &[(Section, &str, &str)] = &[
    (Section::Dependencies, "react-router-dom", "^6.26.0"),
    (Section::Dependencies, "@tanstack/react-query", "^5.51.0"),
    (Section::Dependencies, "react-helmet-async", "^2.0.5"),
    (Section::Dependencies, "@unpic/react", "^0.1.14"),
    (Section::DevDependencies, "vite", "^5.4.0"),
    (Section::DevDependencies, "@vitejs/plugin-react", "^4.3.1"),
];

static NEXT_COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s;&|(])next\s+(dev|build|start|lint)\b").unwrap());

static NEXT_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s;&|(])next\s+export\b").unwrap());

fn vite_command(next: &str) -> &'static str {
    match next {
        "dev" => "vite",
        "build" => "vite build",
        "start" => "vite preview",
        _ => "eslint .",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DependencyChange {
    Removed {
        name: String,
        section: Section,
    },
    Replaced {
        name: String,
        replacement: String,
        version: String,
        section: Section,
    },
    Added {
        name: String,
        version: String,
        section: Section,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptChange {
    pub name: String,
    pub before: String,
    pub after: String,
}

/// Everything one `migrate` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestUpdate {
    pub dependencies: Vec<DependencyChange>,
    pub scripts: Vec<ScriptChange>,
    pub warnings: Vec<String>,
}

impl ManifestUpdate {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.scripts.is_empty()
    }
}

/// A parsed `package.json`, edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    value: Value,
}

impl PackageManifest {
    pub fn from_value(value: Value) -> Result<Self, ManifestError> {
        if !value.is_object() {
            return Err(ManifestError::NotAnObject);
        }
        Ok(Self { value })
    }

    pub fn from_json_str(text: &str) -> Result<Self, ManifestError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(&self.value)?)
    }

    /// Declared version of `name` in `section`.
    pub fn version(&self, section: Section, name: &str) -> Option<&str> {
        self.value.get(section.key())?.get(name)?.as_str()
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.value.get(SCRIPTS)?.get(name)?.as_str()
    }

    /// Removes Next.js packages (adding replacements where one exists), adds
    /// the Vite and React Router stack and rewrites `next` scripts. Packages
    /// already declared keep their versions, so a second call changes nothing.
    ///
    /// Sections are validated before anything is touched: on error the
    /// manifest is unchanged.
    pub fn migrate(&mut self) -> Result<ManifestUpdate, ManifestError> {
        let root = self.value.as_object_mut().ok_or(ManifestError::NotAnObject)?;
        let keys = Section::ALL.iter().map(|s| s.key()).chain([SCRIPTS]);
        for key in keys {
            if root.get(key).is_some_and(|value| !value.is_object()) {
                return Err(ManifestError::InvalidSection(key.to_string()));
            }
        }

        let mut update = ManifestUpdate::default();
        remove_next_packages(root, &mut update)?;
        add_vite_stack(root, &mut update)?;
        rewrite_scripts(root, &mut update);

        info!(
            dependencies = update.dependencies.len(),
            scripts = update.scripts.len(),
            "migrated package manifest"
        );
        Ok(update)
    }
}

fn is_declared(root: &Map<String, Value>, name: &str) -> bool {
    Section::ALL
        .iter()
        .any(|section| root.get(section.key()).and_then(|deps| deps.get(name)).is_some())
}

fn section_mut(
    root: &mut Map<String, Value>,
    section: Section,
) -> Result<&mut Map<String, Value>, ManifestError> {
    root.entry(section.key())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| ManifestError::InvalidSection(section.key().to_string()))
}

fn remove_next_packages(
    root: &mut Map<String, Value>,
    update: &mut ManifestUpdate,
) -> Result<(), ManifestError> {
    for package in NEXT_PACKAGES {
        let removed_from: Vec<Section> = Section::ALL
            .into_iter()
            .filter(|section| {
                root.get_mut(section.key())
                    .and_then(Value::as_object_mut)
                    .and_then(|deps| deps.remove(package.name))
                    .is_some()
            })
            .collect();

        for section in removed_from {
            let change = match package.replacement {
                Some((replacement, version)) if !is_declared(root, replacement) => {
                    section_mut(root, section)?
                        .insert(replacement.to_string(), Value::String(version.to_string()));
                    DependencyChange::Replaced {
                        name: package.name.to_string(),
                        replacement: replacement.to_string(),
                        version: version.to_string(),
                        section,
                    }
                }
                _ => DependencyChange::Removed {
                    name: package.name.to_string(),
                    section,
                },
            };
            debug!(?change, "dependency");
            update.dependencies.push(change);
            if let Some(note) = package.note {
                update.warnings.push(note.to_string());
            }
        }
    }
    Ok(())
}

fn add_vite_stack(
    root: &mut Map<String, Value>,
    update: &mut ManifestUpdate,
) -> Result<(), ManifestError> {
    for &(section, name, version) in ADDITIONS {
        if is_declared(root, name) {
            continue;
        }
        section_mut(root, section)?.insert(name.to_string(), Value::String(version.to_string()));
        let change = DependencyChange::Added {
            name: name.to_string(),
            version: version.to_string(),
            section,
        };
        debug!(?change, "dependency");
        update.dependencies.push(change);
    }
    Ok(())
}

fn rewrite_scripts(root: &mut Map<String, Value>, update: &mut ManifestUpdate) {
    let Some(scripts) = root.get_mut(SCRIPTS).and_then(Value::as_object_mut) else {
        return;
    };

    for (name, command) in scripts.iter_mut() {
        let Some(before) = command.as_str().map(str::to_string) else {
            update
                .warnings
                .push(format!("script '{name}' is not a string; left unchanged"));
            continue;
        };

        let after = NEXT_COMMAND
            .replace_all(&before, |caps: &Captures| {
                format!("{}{}", &caps[1], vite_command(&caps[2]))
            })
            .into_owned();
        if NEXT_EXPORT.is_match(&after) {
            update.warnings.push(format!(
                "script '{name}' runs next export; vite build already emits a static site"
            ));
        }
        if after != before {
            debug!(script = %name, %before, %after, "rewrote script");
            *command = Value::String(after.clone());
            update.scripts.push(ScriptChange {
                name: name.clone(),
                before,
                after,
            });
        }
    }
}
