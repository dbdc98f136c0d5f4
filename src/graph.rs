use crate::record::PersonRecord;
use std::collections::BTreeMap;
use std::fmt;

/// A linked graph node. Unlike a raw [`PersonRecord`], every partner and
/// child id stored here resolves inside the owning [`FamilyGraph`]: unknown
/// references are replaced by synthesized placeholder persons during linking.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub partner: Option<String>,
    pub children: Vec<String>,
}

/// The linked person set for one loaded dataset, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    persons: BTreeMap<String, Person>,
}

impl FamilyGraph {
    pub fn get(&self, id: &str) -> Option<&Person> {
        self.persons.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.persons.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Finds a person listing `id` among their children, if any.
    pub fn parent_of(&self, id: &str) -> Option<&Person> {
        self.persons
            .values()
            .find(|person| person.children.iter().any(|child| child == id))
    }

    /// One-level upward search for the display root: the candidate's parent
    /// when one is known, otherwise the candidate itself. Walking further up
    /// takes one re-root per generation, so the viewer climbs interactively.
    pub fn find_root<'a>(&'a self, candidate: &'a str) -> &'a str {
        match self.parent_of(candidate) {
            Some(parent) => parent.id.as_str(),
            None => candidate,
        }
    }
}

/// A non-fatal problem found while resolving id references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkWarning {
    UnknownPartner { of: String, id: String },
    UnknownChild { of: String, id: String },
}

impl fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkWarning::UnknownPartner { of, id } => {
                write!(f, "partner '{id}' of '{of}' has no record; placeholder created")
            }
            LinkWarning::UnknownChild { of, id } => {
                write!(f, "child '{id}' of '{of}' has no record; placeholder created")
            }
        }
    }
}

/// Resolves merged records into a [`FamilyGraph`].
///
/// Pass 1 creates one person per record. Pass 2 resolves partner and child
/// references; an unknown id produces a warning and a placeholder person
/// named after the missing id. The placeholder's partner is back-inferred
/// from the records (first one whose partner field points at the missing id
/// wins), so a one-sided partner reference still yields a mutual pair.
/// Placeholders join the working set, so repeated references share one entry.
pub fn link_records(records: &[PersonRecord]) -> (FamilyGraph, Vec<LinkWarning>) {
    let mut persons: BTreeMap<String, Person> = BTreeMap::new();
    let mut warnings: Vec<LinkWarning> = Vec::new();

    for record in records {
        let mut children: Vec<String> = Vec::new();
        for child in record.children.iter().flatten() {
            if !children.contains(child) {
                children.push(child.clone());
            }
        }
        persons.insert(
            record.id.clone(),
            Person {
                id: record.id.clone(),
                name: record.name.clone().unwrap_or_else(|| record.id.clone()),
                partner: record.partner.clone(),
                children,
            },
        );
    }

    for record in records {
        if let Some(partner_id) = &record.partner
            && !persons.contains_key(partner_id)
        {
            warnings.push(LinkWarning::UnknownPartner {
                of: record.id.clone(),
                id: partner_id.clone(),
            });
            synthesize(partner_id, records, &mut persons);
        }
        for child_id in record.children.iter().flatten() {
            if !persons.contains_key(child_id) {
                warnings.push(LinkWarning::UnknownChild {
                    of: record.id.clone(),
                    id: child_id.clone(),
                });
                synthesize(child_id, records, &mut persons);
            }
        }
    }

    enforce_partner_symmetry(&mut persons);

    (FamilyGraph { persons }, warnings)
}

/// Adds a placeholder person for a dangling id. The name mirrors the missing
/// id; the partner is back-inferred by scanning the records for one that
/// points at it.
fn synthesize(id: &str, records: &[PersonRecord], persons: &mut BTreeMap<String, Person>) {
    let partner = records
        .iter()
        .find(|record| record.partner.as_deref() == Some(id))
        .map(|record| record.id.clone());
    persons.insert(
        id.to_string(),
        Person {
            id: id.to_string(),
            name: id.to_string(),
            partner,
            children: Vec::new(),
        },
    );
}

/// Makes the partner relation symmetric: whenever A points at B and B has no
/// partner yet, B points back at A. An already-populated partner is left
/// alone, matching the fill-gaps-only merge policy.
fn enforce_partner_symmetry(persons: &mut BTreeMap<String, Person>) {
    let pairs: Vec<(String, String)> = persons
        .values()
        .filter_map(|person| {
            person
                .partner
                .clone()
                .map(|partner| (person.id.clone(), partner))
        })
        .collect();
    for (id, partner_id) in pairs {
        if let Some(partner) = persons.get_mut(&partner_id)
            && partner.partner.is_none()
        {
            partner.partner = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, partner: Option<&str>, children: &[&str]) -> PersonRecord {
        PersonRecord {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            partner: partner.map(|p| p.to_string()),
            children: if children.is_empty() {
                None
            } else {
                Some(children.iter().map(|c| c.to_string()).collect())
            },
        }
    }

    #[test]
    fn links_couple_with_children() {
        let records = vec![
            record("a", Some("b"), &[]),
            record("b", Some("a"), &["c", "d"]),
            record("c", None, &[]),
            record("d", None, &[]),
        ];
        let (graph, warnings) = link_records(&records);
        assert!(warnings.is_empty());
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get("a").unwrap().partner.as_deref(), Some("b"));
        assert_eq!(graph.get("b").unwrap().children, vec!["c", "d"]);
    }

    #[test]
    fn dangling_child_gets_placeholder_and_warning() {
        let records = vec![record("a", Some("b"), &["x"]), record("b", Some("a"), &[])];
        let (graph, warnings) = link_records(&records);
        assert_eq!(
            warnings,
            vec![LinkWarning::UnknownChild {
                of: "a".to_string(),
                id: "x".to_string(),
            }]
        );
        let placeholder = graph.get("x").expect("placeholder missing");
        assert_eq!(placeholder.name, "x");
        assert!(placeholder.children.is_empty());
    }

    #[test]
    fn dangling_partner_is_back_linked() {
        // "a" names a partner that has no record; the placeholder should
        // point back at "a" so the pair renders as a couple.
        let records = vec![record("a", Some("ghost"), &[])];
        let (graph, warnings) = link_records(&records);
        assert_eq!(warnings.len(), 1);
        let ghost = graph.get("ghost").expect("placeholder missing");
        assert_eq!(ghost.partner.as_deref(), Some("a"));
        assert_eq!(graph.get("a").unwrap().partner.as_deref(), Some("ghost"));
    }

    #[test]
    fn repeated_dangling_reference_shares_one_placeholder() {
        let records = vec![
            record("a", Some("b"), &["x"]),
            record("b", Some("a"), &["x"]),
        ];
        let (graph, warnings) = link_records(&records);
        // The second reference resolves against the placeholder made for the
        // first one, so only one warning is raised.
        assert_eq!(warnings.len(), 1);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn one_sided_partner_reference_becomes_mutual() {
        let records = vec![record("a", Some("b"), &[]), record("b", None, &[])];
        let (graph, warnings) = link_records(&records);
        assert!(warnings.is_empty());
        assert_eq!(graph.get("b").unwrap().partner.as_deref(), Some("a"));
    }

    #[test]
    fn existing_partner_is_not_rewritten_by_symmetry() {
        let records = vec![
            record("a", Some("b"), &[]),
            record("b", Some("c"), &[]),
            record("c", Some("b"), &[]),
        ];
        let (graph, _) = link_records(&records);
        assert_eq!(graph.get("b").unwrap().partner.as_deref(), Some("c"));
    }

    #[test]
    fn duplicate_children_within_one_record_are_dropped() {
        let records = vec![
            record("a", Some("b"), &["c", "c"]),
            record("b", Some("a"), &[]),
            record("c", None, &[]),
        ];
        let (graph, _) = link_records(&records);
        assert_eq!(graph.get("a").unwrap().children, vec!["c"]);
    }

    #[test]
    fn missing_name_defaults_to_id() {
        let records = vec![PersonRecord {
            id: "a".to_string(),
            name: None,
            partner: None,
            children: None,
        }];
        let (graph, _) = link_records(&records);
        assert_eq!(graph.get("a").unwrap().name, "a");
    }

    #[test]
    fn find_root_walks_one_level_up() {
        let records = vec![
            record("gramps", Some("granny"), &["parent"]),
            record("granny", Some("gramps"), &[]),
            record("parent", Some("spouse"), &["kid"]),
            record("spouse", Some("parent"), &[]),
            record("kid", None, &[]),
        ];
        let (graph, _) = link_records(&records);
        assert_eq!(graph.find_root("kid"), "parent");
        assert_eq!(graph.find_root("parent"), "gramps");
        assert_eq!(graph.find_root("gramps"), "gramps");
    }
}
