//! Static skill catalog: characters, trees and generated skills.
//!
//! The catalog is generated once at startup and injected wherever it is
//! needed. Generation is deterministic: skill ids follow the
//! `{characterId}-{treeColor}-s{n}` scheme with `n` incrementing per tree
//! across rows in table order. Persisted builds reference skills by these
//! ids, so the id scheme is the durable contract — positions and names can
//! change, ids must not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Character a fresh draft starts with.
pub const DEFAULT_CHARACTER_ID: &str = "amon";

/// Tree colors in display order.
pub const TREE_COLORS: [&str; 3] = ["green", "red", "blue"];

/// Per-tree row layout: for each row, the (type, count) groups in order.
const ROW_LAYOUT: [(u32, &[(SkillType, u32)]); 6] = [
    (1, &[(SkillType::Passive, 4)]),
    (2, &[(SkillType::Passive, 3), (SkillType::Augment, 2)]),
    (3, &[(SkillType::Passive, 4)]),
    (4, &[(SkillType::Passive, 6), (SkillType::Augment, 3)]),
    (5, &[(SkillType::Passive, 9)]),
    (6, &[(SkillType::Passive, 3), (SkillType::Capstone, 3)]),
];

/// Playable character roster: (id, display name).
const CHARACTERS: [(&str, &str); 4] = [
    ("amon", "Amon"),
    ("vex", "Vex"),
    ("rafa", "Rafa"),
    ("harlowe", "Harlowe"),
];

/// Kind of a skill node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Passive,
    Augment,
    Capstone,
}

impl SkillType {
    /// Point cap for skills of this type.
    pub fn max_points(self) -> u32 {
        match self {
            SkillType::Passive => 5,
            SkillType::Augment | SkillType::Capstone => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillType::Passive => "passive",
            SkillType::Augment => "augment",
            SkillType::Capstone => "capstone",
        }
    }

    /// Capitalized form used in generated skill names.
    pub fn label(self) -> &'static str {
        match self {
            SkillType::Passive => "Passive",
            SkillType::Augment => "Augment",
            SkillType::Capstone => "Capstone",
        }
    }
}

/// A single skill node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub row: u32,
    #[serde(rename = "type")]
    pub kind: SkillType,
    pub max_points: u32,
}

/// One of a character's three skill trees.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkillTree {
    pub name: String,
    pub skills: Vec<Skill>,
}

/// The three trees of a character, keyed by color on the wire.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CharacterTrees {
    pub green: SkillTree,
    pub red: SkillTree,
    pub blue: SkillTree,
}

/// A playable character and their full skill layout.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub trees: CharacterTrees,
}

impl Character {
    /// Trees in display order (green, red, blue).
    pub fn trees_in_order(&self) -> [&SkillTree; 3] {
        [&self.trees.green, &self.trees.red, &self.trees.blue]
    }

    /// All of this character's skills, flattened in tree order.
    pub fn all_skills(&self) -> impl Iterator<Item = &Skill> {
        self.trees_in_order().into_iter().flat_map(|t| &t.skills)
    }
}

/// The full static catalog.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Catalog {
    pub characters: Vec<Character>,
}

impl Catalog {
    /// Generate the catalog. Deterministic; two calls produce identical data.
    pub fn generate() -> Self {
        Self {
            characters: CHARACTERS
                .iter()
                .map(|(id, name)| generate_character(id, name))
                .collect(),
        }
    }

    /// Look up a character by id.
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// All skills of one character, flattened in tree order. Empty for an
    /// unknown character id.
    pub fn skills_for_character(&self, character_id: &str) -> Vec<&Skill> {
        self.character(character_id)
            .map(|c| c.all_skills().collect())
            .unwrap_or_default()
    }

    /// An all-zero skill point map covering the character's full skill set.
    pub fn zeroed_skill_points(&self, character_id: &str) -> BTreeMap<String, u32> {
        self.skills_for_character(character_id)
            .into_iter()
            .map(|s| (s.id.clone(), 0))
            .collect()
    }

    /// Catalog-wide skill lookup by id, scanning every character and tree.
    ///
    /// Deliberately character-agnostic: skill ids embed their character and
    /// tree, so they are globally unique by construction and the viewer does
    /// not need to know which character a build belongs to.
    pub fn find_skill(&self, skill_id: &str) -> Option<&Skill> {
        self.characters
            .iter()
            .flat_map(|c| c.all_skills())
            .find(|s| s.id == skill_id)
    }

    /// Point cap for a skill id under the given character, if it resolves.
    pub fn max_points(&self, character_id: &str, skill_id: &str) -> Option<u32> {
        self.character(character_id)?
            .all_skills()
            .find(|s| s.id == skill_id)
            .map(|s| s.max_points)
    }

    /// Clamp every resolvable entry of a skill point map to `[0, maxPoints]`
    /// under the given character. Entries that do not resolve are left
    /// untouched (per-skill caps are the only validation this system does).
    pub fn clamp_skill_points(&self, character_id: &str, points: &mut BTreeMap<String, u32>) {
        let Some(character) = self.character(character_id) else {
            return;
        };
        for skill in character.all_skills() {
            if let Some(p) = points.get_mut(&skill.id) {
                if *p > skill.max_points {
                    *p = skill.max_points;
                }
            }
        }
    }
}

fn generate_skills(character_id: &str, tree_color: &str) -> Vec<Skill> {
    let mut skills = Vec::new();
    let mut n = 1u32;

    for (row, groups) in ROW_LAYOUT {
        for &(kind, count) in groups {
            for _ in 0..count {
                skills.push(Skill {
                    id: format!("{}-{}-s{}", character_id, tree_color, n),
                    name: format!("{} Skill {}", kind.label(), n),
                    description: format!(
                        "Placeholder description for a {} skill in row {}.",
                        kind.as_str(),
                        row
                    ),
                    row,
                    kind,
                    max_points: kind.max_points(),
                });
                n += 1;
            }
        }
    }

    skills
}

fn generate_character(id: &str, name: &str) -> Character {
    let tree = |color: &str, display: &str| SkillTree {
        name: display.to_string(),
        skills: generate_skills(id, color),
    };

    Character {
        id: id.to_string(),
        name: name.to_string(),
        trees: CharacterTrees {
            green: tree("green", "Green Tree"),
            red: tree("red", "Red Tree"),
            blue: tree("blue", "Blue Tree"),
        },
    }
}
