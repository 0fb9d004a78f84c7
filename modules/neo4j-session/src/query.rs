//! Cypher text builders for the session helpers.
//!
//! Values always travel as bound parameters. Labels, relationship types and
//! property keys cannot be parameterized in Cypher, so they are validated with
//! [`identifier::validate`] and then spliced into the text.

use std::collections::BTreeMap;

use neo4rs::BoltType;

use crate::error::{GraphError, Result};
use crate::identifier::{validate, IdentifierKind};
use crate::properties::Properties;

/// Query text plus its bound parameters, inspectable before it is handed to
/// the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    text: String,
    params: BTreeMap<String, BoltType>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<BoltType>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Bind every entry of `properties` as its own top-level parameter.
    pub fn params_from(mut self, properties: &Properties) -> Self {
        for (key, value) in properties.iter() {
            self.params.insert(key.clone(), value.to_bolt());
        }
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &BTreeMap<String, BoltType> {
        &self.params
    }

    pub fn into_query(self) -> neo4rs::Query {
        self.params
            .into_iter()
            .fold(neo4rs::query(&self.text), |q, (key, value)| {
                q.param(&key, value)
            })
    }
}

pub fn show_databases() -> CypherQuery {
    CypherQuery::new("SHOW DATABASES")
}

pub fn create_node(label: &str, properties: &Properties) -> Result<CypherQuery> {
    let label = validate(IdentifierKind::Label, label)?;
    Ok(CypherQuery::new(format!("CREATE (a:{label} $properties) RETURN a"))
        .param("properties", properties.to_bolt()))
}

/// Matching is by the `name` property only. Zero matches on either side create
/// nothing; several matches create one edge per (start, end) pair.
pub fn create_relationship(
    start_node: &str,
    rel_type: &str,
    end_node: &str,
    start_label: &str,
    end_label: &str,
) -> Result<CypherQuery> {
    let start_label = validate(IdentifierKind::Label, start_label)?;
    let end_label = validate(IdentifierKind::Label, end_label)?;
    let rel_type = validate(IdentifierKind::RelationshipType, rel_type)?;

    let text = format!(
        "MATCH (a:{start_label} {{name: $start_node}})
         MATCH (b:{end_label} {{name: $end_node}})
         CREATE (a)-[r:{rel_type}]->(b)
         RETURN count(r) AS created"
    );
    Ok(CypherQuery::new(text)
        .param("start_node", start_node)
        .param("end_node", end_node))
}

pub fn delete_node(label: &str, properties: &Properties) -> Result<CypherQuery> {
    let label = validate(IdentifierKind::Label, label)?;
    if properties.is_empty() {
        return Err(GraphError::EmptyMatch {
            label: label.to_string(),
        });
    }

    let conditions = properties
        .keys()
        .map(|key| {
            validate(IdentifierKind::PropertyKey, key).map(|key| format!("a.{key} = ${key}"))
        })
        .collect::<Result<Vec<_>>>()?
        .join(" AND ");

    Ok(CypherQuery::new(format!(
        "MATCH (a:{label}) WHERE {conditions} DETACH DELETE a RETURN count(*) AS deleted"
    ))
    .params_from(properties))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Properties {
        Properties::new().with("name", "Alice").with("age", 30)
    }

    #[test]
    fn create_node_binds_properties_as_one_map() {
        let q = create_node("Person", &alice()).unwrap();
        assert_eq!(q.text(), "CREATE (a:Person $properties) RETURN a");
        assert_eq!(q.params().keys().collect::<Vec<_>>(), ["properties"]);
    }

    #[test]
    fn property_values_never_reach_query_text() {
        let hostile = "x'}) DETACH DELETE (n) //";
        let props = Properties::new().with("name", hostile);

        let create = create_node("Person", &props).unwrap();
        assert!(!create.text().contains(hostile));

        let delete = delete_node("Person", &props).unwrap();
        assert!(!delete.text().contains(hostile));
        assert_eq!(
            delete.params().get("name"),
            Some(&BoltType::from(hostile))
        );
    }

    #[test]
    fn create_relationship_matches_by_name() {
        let q = create_relationship("Alice", "FRIENDS_WITH", "Bob", "Person", "Person").unwrap();
        assert!(q.text().contains("MATCH (a:Person {name: $start_node})"));
        assert!(q.text().contains("MATCH (b:Person {name: $end_node})"));
        assert!(q.text().contains("CREATE (a)-[r:FRIENDS_WITH]->(b)"));
        assert_eq!(q.params().get("start_node"), Some(&BoltType::from("Alice")));
        assert_eq!(q.params().get("end_node"), Some(&BoltType::from("Bob")));
    }

    #[test]
    fn create_relationship_rejects_unsafe_type_and_labels() {
        let err = create_relationship("a", "KNOWS]->(b) DELETE (b", "b", "Person", "Person")
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidIdentifier { kind: "relationship type", .. }
        ));

        assert!(create_relationship("a", "KNOWS", "b", "Person)", "Person").is_err());
        assert!(create_relationship("a", "KNOWS", "b", "Person", "").is_err());
    }

    #[test]
    fn delete_node_conjoins_every_key() {
        let q = delete_node("Person", &alice()).unwrap();
        assert_eq!(
            q.text(),
            "MATCH (a:Person) WHERE a.age = $age AND a.name = $name DETACH DELETE a RETURN count(*) AS deleted"
        );
        assert_eq!(q.params().len(), 2);
    }

    #[test]
    fn delete_node_without_properties_fails_fast() {
        let err = delete_node("Person", &Properties::new()).unwrap_err();
        assert!(matches!(err, GraphError::EmptyMatch { ref label } if label == "Person"));
    }

    #[test]
    fn delete_node_rejects_unsafe_property_keys() {
        let props = Properties::new().with("name = 'x' OR true OR a.name", "Alice");
        let err = delete_node("Person", &props).unwrap_err();
        assert!(matches!(err, GraphError::InvalidIdentifier { kind: "property key", .. }));
    }

    #[test]
    fn unsafe_label_is_rejected_before_any_text_is_built() {
        let err = create_node("Person {admin: true}) //", &alice()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidIdentifier { kind: "label", .. }));
    }
}
