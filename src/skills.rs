use std::collections::HashMap;

/// Skill names as the portal lists them, with the id it expects in `skill_ids`
pub const BUILTIN_SKILLS: &[(&str, &str)] = &[
    ("JavaScript", "1"),
    ("PHP", "2"),
    ("Python", "3"),
    ("Laravel", "4"),
    ("CakePHP", "5"),
    ("WordPress", "6"),
    ("Flutter", "7"),
    ("FilamentPHP", "8"),
    ("React.js", "9"),
    ("Java", "10"),
    ("C++", "11"),
    ("AWS", "12"),
    ("Azure", "13"),
    ("Google Cloud", "14"),
    ("Machine learning", "15"),
    ("Data visualization", "16"),
    ("Statistical analysis", "17"),
    ("Network architecture", "18"),
    ("Database design", "19"),
    ("SQL", "20"),
    ("NoSQL", "21"),
    ("MongoDB", "22"),
    ("Cassandra", "23"),
    ("DevOps", "24"),
    ("TensorFlow", "25"),
    ("PyTorch", "26"),
    ("computer vision", "27"),
    ("Natural language processing", "28"),
    ("HTML", "29"),
    ("CSS", "30"),
    ("React", "31"),
    ("Angular", "32"),
    ("Vue.js", "33"),
    ("Node.js", "34"),
    ("Ruby on Rails", "35"),
    ("CodeIgniter", "36"),
    ("IaaS", "37"),
    ("PaaS", "38"),
    ("SaaS", "39"),
    ("Cloud access control", "40"),
    ("Data encryption", "41"),
    ("MySQL", "42"),
    ("PostgreSQL", "43"),
    ("Data modeling", "44"),
    ("Indexing", "45"),
    ("TCP/IP", "46"),
    ("DHCP", "47"),
    ("LAN", "48"),
    ("WAN", "49"),
    ("Firewall configuration", "50"),
    ("Keras", "51"),
    ("VPNs", "52"),
    ("scikit-learn", "53"),
    ("Tableau", "54"),
    ("Power BI", "55"),
    ("D3.js", "56"),
    ("Xamarin", "57"),
    ("Swift", "58"),
    ("Objective-C", "59"),
    ("Xcode", "60"),
    ("Android Studio", "61"),
    ("Kotlin", "62"),
    ("Git", "63"),
    ("Kubernetes", "64"),
    ("Docker", "65"),
    ("TypeScript", "66"),
    ("VLSI Design", "67"),
    ("Circuit Design", "68"),
    ("Layout Design", "69"),
    ("Physical Design", "70"),
    ("Digital Design", "71"),
    ("Design with FPGA", "72"),
    ("Verification & Validations", "73"),
    ("IoT", "74"),
    ("Embedded Systems", "75"),
    ("Intelligent Machines", "76"),
    ("BIM FOR CONSTRUCTION", "77"),
    ("BIM FOR ARCHITECTURE", "78"),
    ("INTERIOR AND EXTERIOR DESIGN", "79"),
    ("BIM FOR STRUCTURES", "80"),
    ("BIM FOR HIGHWAY ENGINEERING", "81"),
    ("PRODUCT DESIGN & 3D PRINTING", "82"),
    ("PRODUCT DESIGN & MANUFACTURING", "83"),
    ("BIM CONCEPTS WITH MEP AND PRODUCT DESIGN", "84"),
    ("3D PRINTING CONCEPTS, DESIGN AND PRINTING", "85"),
    ("Manufacturing", "86"),
];

/// Immutable skill name -> id lookup. Names match exactly (case-sensitive).
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    ids: HashMap<String, String>,
}

/// Result of resolving one `skills` cell
#[derive(Debug, Default, PartialEq)]
pub struct ResolvedSkills {
    pub ids: Vec<String>,
    /// Names that had no catalog entry, in the order they were listed
    pub unknown: Vec<String>,
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::from_pairs(
            BUILTIN_SKILLS
                .iter()
                .map(|(name, id)| (name.to_string(), id.to_string())),
        )
    }
}

impl SkillCatalog {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        SkillCatalog {
            ids: pairs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(|s| s.as_str())
    }

    /// Resolve a comma-separated list of skill names.
    ///
    /// Order and duplicates are kept. Names not in the catalog are dropped from
    /// `ids` and reported in `unknown`; blank tokens are ignored entirely.
    pub fn resolve(&self, cell: Option<&str>) -> ResolvedSkills {
        let mut resolved = ResolvedSkills::default();
        let Some(cell) = cell else {
            return resolved;
        };

        for token in cell.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            match self.get(token) {
                Some(id) => resolved.ids.push(id.to_string()),
                None => resolved.unknown.push(token.to_string()),
            }
        }

        resolved
    }
}
