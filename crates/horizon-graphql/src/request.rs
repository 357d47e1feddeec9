//! GraphQL request type and its wire forms.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::naming::rename_keys;
use crate::settings::JsonSettings;

/// A GraphQL request.
///
/// Holds a non-empty query document plus an optional operation name and
/// variable bindings. The query is validated when the request is created, so
/// every value of this type is ready to be sent.
///
/// # Example
///
/// ```
/// use horizon_graphql::GraphQLRequest;
///
/// let request = GraphQLRequest::new(r#"
///     query Person($personId: ID!) {
///         person(personID: $personId) { name }
///     }
/// "#)?
/// .operation_name("Person")
/// .variable("personId", "1")?;
///
/// assert_eq!(request.operation_name_ref(), Some("Person"));
/// # Ok::<(), horizon_graphql::Error>(())
/// ```
///
/// `Serialize` writes the same object as [`encode_body`](Self::encode_body)
/// with default [`JsonSettings`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRequest")]
pub struct GraphQLRequest {
    query: String,
    operation_name: Option<String>,
    variables: Option<Map<String, Value>>,
    extensions: Option<Map<String, Value>>,
}

impl Serialize for GraphQLRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire_object(&JsonSettings::default())
            .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct RawRequest {
    query: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
    variables: Option<Map<String, Value>>,
    extensions: Option<Map<String, Value>>,
}

impl TryFrom<RawRequest> for GraphQLRequest {
    type Error = Error;

    fn try_from(raw: RawRequest) -> Result<Self> {
        let mut request = Self::new(raw.query.unwrap_or_default())?;
        request.operation_name = raw.operation_name;
        request.variables = raw.variables;
        request.extensions = raw.extensions;
        Ok(request)
    }
}

impl GraphQLRequest {
    /// Create a request from a query document.
    ///
    /// Fails with [`Error::InvalidArgument`] if the query is empty or only
    /// whitespace.
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::invalid_argument("query", "must not be empty"));
        }
        Ok(Self {
            query,
            operation_name: None,
            variables: None,
            extensions: None,
        })
    }

    /// Set the operation name.
    ///
    /// Required when the query document contains multiple operations.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Bind a single variable.
    ///
    /// ```
    /// # use horizon_graphql::GraphQLRequest;
    /// let request = GraphQLRequest::new("query($id: ID!, $first: Int) { ... }")?
    ///     .variable("id", "123")?
    ///     .variable("first", 10)?;
    /// # Ok::<(), horizon_graphql::Error>(())
    /// ```
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        self.variables
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        Ok(self)
    }

    /// Replace all variables with a serializable value.
    ///
    /// The value must serialize to a JSON object (a struct or a map); `null`
    /// clears the variables.
    pub fn variables(mut self, variables: impl Serialize) -> Result<Self> {
        self.variables = object_or_null("variables", serde_json::to_value(variables)?)?;
        Ok(self)
    }

    /// Replace all variables from a map.
    pub fn variables_map(mut self, variables: HashMap<String, Value>) -> Self {
        self.variables = Some(variables.into_iter().collect());
        self
    }

    /// Set request extensions (implementation-specific metadata).
    pub fn extensions(mut self, extensions: impl Serialize) -> Result<Self> {
        self.extensions = object_or_null("extensions", serde_json::to_value(extensions)?)?;
        Ok(self)
    }

    /// The query document.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The selected operation, if any.
    pub fn operation_name_ref(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// The variable bindings, if any.
    pub fn variables_ref(&self) -> Option<&Map<String, Value>> {
        self.variables.as_ref()
    }

    /// The request extensions, if any.
    pub fn extensions_ref(&self) -> Option<&Map<String, Value>> {
        self.extensions.as_ref()
    }

    /// Variables as they go on the wire.
    ///
    /// Variable names are kept verbatim since they must match the `$name`
    /// placeholders in the query; keys inside the values go through the
    /// naming policy.
    fn wire_variables(&self, settings: &JsonSettings) -> Option<Map<String, Value>> {
        let naming = settings.naming_policy();
        self.variables.as_ref().map(|vars| {
            vars.iter()
                .map(|(name, value)| {
                    (name.clone(), rename_keys(value.clone(), &|k| naming.to_wire(k)))
                })
                .collect()
        })
    }

    /// Build the JSON object sent as a POST body.
    pub fn to_wire_object(&self, settings: &JsonSettings) -> Map<String, Value> {
        let omit = settings.omits_null_fields();
        let mut body = Map::new();
        body.insert("query".into(), Value::String(self.query.clone()));

        match &self.operation_name {
            Some(name) => {
                body.insert("operationName".into(), Value::String(name.clone()));
            }
            None if !omit => {
                body.insert("operationName".into(), Value::Null);
            }
            None => {}
        }

        match self.wire_variables(settings) {
            Some(vars) => {
                body.insert("variables".into(), Value::Object(vars));
            }
            None if !omit => {
                body.insert("variables".into(), Value::Null);
            }
            None => {}
        }

        if let Some(ext) = &self.extensions {
            body.insert("extensions".into(), Value::Object(ext.clone()));
        }
        body
    }

    /// Serialize the POST body.
    pub fn encode_body(&self, settings: &JsonSettings) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_wire_object(settings))?)
    }

    /// Build the GET query parameters, in order: `query`, `operationName`,
    /// `variables`, `extensions`.
    ///
    /// Values are returned unencoded; `variables` and `extensions` are JSON
    /// text. Percent-encoding is left to the URL builder.
    pub fn query_pairs(&self, settings: &JsonSettings) -> Result<Vec<(&'static str, String)>> {
        let mut pairs = vec![("query", self.query.clone())];
        if let Some(name) = &self.operation_name {
            pairs.push(("operationName", name.clone()));
        }
        if let Some(vars) = self.wire_variables(settings) {
            pairs.push(("variables", serde_json::to_string(&vars)?));
        }
        if let Some(ext) = &self.extensions {
            pairs.push(("extensions", serde_json::to_string(ext)?));
        }
        Ok(pairs)
    }
}

fn object_or_null(argument: &'static str, value: Value) -> Result<Option<Map<String, Value>>> {
    match value {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(Error::invalid_argument(
            argument,
            format!("must serialize to a JSON object, got {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::ExactNaming;
    use serde_json::json;

    #[test]
    fn test_empty_query_is_rejected() {
        for query in ["", "   ", "\n\t"] {
            match GraphQLRequest::new(query) {
                Err(Error::InvalidArgument { argument, .. }) => assert_eq!(argument, "query"),
                other => panic!("expected invalid argument, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_variables() {
        let request = GraphQLRequest::new("query($id: ID!) { user(id: $id) { name } }")
            .unwrap()
            .variable("id", "123")
            .unwrap()
            .variable("limit", 10)
            .unwrap();

        let vars = request.variables_ref().unwrap();
        assert_eq!(vars["id"], "123");
        assert_eq!(vars["limit"], 10);
    }

    #[test]
    fn test_variables_must_be_an_object() {
        let result = GraphQLRequest::new("{ a }").unwrap().variables(vec![1, 2]);
        assert!(matches!(
            result,
            Err(Error::InvalidArgument { argument: "variables", .. })
        ));

        let cleared = GraphQLRequest::new("{ a }")
            .unwrap()
            .variable("x", 1)
            .unwrap()
            .variables(Value::Null)
            .unwrap();
        assert!(cleared.variables_ref().is_none());
    }

    #[test]
    fn test_operation_name() {
        let request = GraphQLRequest::new("query GetUser { user { id } }")
            .unwrap()
            .operation_name("GetUser");
        assert_eq!(request.operation_name_ref(), Some("GetUser"));
    }

    #[test]
    fn test_body_omits_absent_members_by_default() {
        let request = GraphQLRequest::new("{ hero { name } }").unwrap();
        let body: Value =
            serde_json::from_slice(&request.encode_body(&JsonSettings::default()).unwrap()).unwrap();
        assert_eq!(body, json!({"query": "{ hero { name } }"}));
    }

    #[test]
    fn test_body_writes_nulls_when_configured() {
        let request = GraphQLRequest::new("{ hero { name } }").unwrap();
        let settings = JsonSettings::default().omit_null_fields(false);
        let body = Value::Object(request.to_wire_object(&settings));
        assert_eq!(
            body,
            json!({"query": "{ hero { name } }", "operationName": null, "variables": null})
        );
    }

    #[test]
    fn test_naming_applies_inside_variable_values_only() {
        #[derive(Serialize)]
        struct ReviewInput {
            stars: u8,
            commentary_text: String,
        }

        let request = GraphQLRequest::new("mutation($review_input: ReviewInput!) { x }")
            .unwrap()
            .variable(
                "review_input",
                ReviewInput {
                    stars: 5,
                    commentary_text: "This is a great movie!".into(),
                },
            )
            .unwrap();

        let camel = request.to_wire_object(&JsonSettings::default());
        assert_eq!(
            camel["variables"],
            json!({"review_input": {"stars": 5, "commentaryText": "This is a great movie!"}})
        );

        let exact = request.to_wire_object(&JsonSettings::default().naming(ExactNaming));
        assert_eq!(
            exact["variables"]["review_input"]["commentary_text"],
            "This is a great movie!"
        );
    }

    #[test]
    fn test_query_pairs_order_and_content() {
        let request = GraphQLRequest::new("query Person($personId: ID!) { person }")
            .unwrap()
            .operation_name("Person")
            .variable("personId", "1")
            .unwrap();

        let pairs = request.query_pairs(&JsonSettings::default()).unwrap();
        let names: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(names, ["query", "operationName", "variables"]);
        assert_eq!(pairs[1].1, "Person");
        assert_eq!(pairs[2].1, r#"{"personId":"1"}"#);
    }

    #[test]
    fn test_query_pairs_without_optionals() {
        let request = GraphQLRequest::new("{ a }").unwrap();
        let pairs = request.query_pairs(&JsonSettings::default()).unwrap();
        assert_eq!(pairs, vec![("query", "{ a }".to_string())]);
    }

    #[test]
    fn test_deserialize_validates_query() {
        let ok: GraphQLRequest =
            serde_json::from_str(r#"{"query": "{ a }", "operationName": "A"}"#).unwrap();
        assert_eq!(ok.operation_name_ref(), Some("A"));

        assert!(serde_json::from_str::<GraphQLRequest>(r#"{"query": ""}"#).is_err());
        assert!(serde_json::from_str::<GraphQLRequest>(r#"{"operationName": "A"}"#).is_err());
    }
}
