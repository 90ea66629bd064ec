//! JSON:API document encoding and decoding
//!
//! Requests: an options struct serializes its attribute fields through serde
//! and names its relationships through [`Payload`]; [`encode`] wraps both in
//! the `{"data": {"type", "id", "attributes", "relationships"}}` envelope.
//!
//! Responses: the primary `data` (object or array) is flattened into plain
//! JSON objects where attributes sit next to `id`, and every relationship is
//! replaced by the matching `included` resource (or an `{"id"}` stub when the
//! server did not include it). Resource structs then deserialize from that
//! flat shape with ordinary serde derives.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, TfeError};
use crate::hcp::traits::ListResponse;
use crate::hcp::Pagination;

/// A field that can be left out, set, or explicitly cleared.
///
/// Wrap it in `Option`: `None` omits the field from the request,
/// `Some(Nullable::Null)` sends `null`, `Some(Nullable::Value(v))` sends `v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    /// Send an explicit `null`
    Null,
    /// Send a value
    Value(T),
}

impl<T> From<T> for Nullable<T> {
    fn from(value: T) -> Self {
        Nullable::Value(value)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Nullable::Null => serializer.serialize_none(),
            Nullable::Value(v) => v.serialize(serializer),
        }
    }
}

/// A `{type, id}` resource identifier
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(kind: &str, id: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}

/// Relationship linkage sent in a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// To-one relationship
    One(ResourceIdentifier),
    /// To-many relationship
    Many(Vec<ResourceIdentifier>),
    /// Explicitly detach a to-one relationship
    Null,
}

impl Relation {
    pub fn one(kind: &str, id: impl Into<String>) -> Self {
        Relation::One(ResourceIdentifier::new(kind, id))
    }

    pub fn many<I, S>(kind: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Relation::Many(
            ids.into_iter()
                .map(|id| ResourceIdentifier::new(kind, id))
                .collect(),
        )
    }

    fn to_value(&self) -> Value {
        let data = match self {
            Relation::One(ident) => serde_json::json!(ident),
            Relation::Many(idents) => serde_json::json!(idents),
            Relation::Null => Value::Null,
        };
        serde_json::json!({ "data": data })
    }
}

/// An options struct that can be sent as a JSON:API resource object.
///
/// The struct's own `Serialize` impl produces the `attributes` object, so
/// relationship fields must be `#[serde(skip)]` and reported through
/// [`Payload::relationships`] instead.
pub trait Payload: Serialize {
    /// The JSON:API `type` of the resource being written
    fn resource_type(&self) -> &'static str;

    /// The resource id, for updates that carry one in the body
    fn resource_id(&self) -> Option<&str> {
        None
    }

    /// Relationship name → linkage
    fn relationships(&self) -> Vec<(&'static str, Relation)> {
        Vec::new()
    }
}

/// Wrap a payload in a JSON:API document
pub fn encode<P: Payload>(payload: &P) -> Result<Value> {
    let mut data = Map::new();
    data.insert(
        "type".to_string(),
        Value::String(payload.resource_type().to_string()),
    );
    if let Some(id) = payload.resource_id() {
        data.insert("id".to_string(), Value::String(id.to_string()));
    }

    match serde_json::to_value(payload)? {
        Value::Object(attributes) if !attributes.is_empty() => {
            data.insert("attributes".to_string(), Value::Object(attributes));
        }
        Value::Object(_) | Value::Null => {}
        other => {
            return Err(TfeError::Encode(format!(
                "attributes of '{}' must serialize to an object, got {}",
                payload.resource_type(),
                other
            )))
        }
    }

    let relationships = payload.relationships();
    if !relationships.is_empty() {
        let map: Map<String, Value> = relationships
            .into_iter()
            .map(|(name, relation)| (name.to_string(), relation.to_value()))
            .collect();
        data.insert("relationships".to_string(), Value::Object(map));
    }

    Ok(serde_json::json!({ "data": Value::Object(data) }))
}

#[derive(Deserialize, Debug)]
struct Document {
    #[serde(default)]
    data: Option<PrimaryData>,
    #[serde(default)]
    included: Vec<ResourceObject>,
    #[serde(default)]
    meta: Option<DocumentMeta>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum PrimaryData {
    Many(Vec<ResourceObject>),
    One(Box<ResourceObject>),
}

#[derive(Deserialize, Debug, Default)]
struct DocumentMeta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize, Debug)]
struct ResourceObject {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    relationships: Map<String, Value>,
    #[serde(default)]
    links: Option<Value>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Linkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// Relationship linkage, `None` for `null`, missing, or links-only relationships
fn linkage_of(relationship: &Value) -> Option<Linkage> {
    match relationship.get("data") {
        None | Some(Value::Null) => None,
        Some(data) => serde_json::from_value(data.clone()).ok(),
    }
}

/// Deepest level an included object is expanded at; two levels cover
/// dotted includes such as `current_run.plan`
const MAX_INCLUDE_DEPTH: usize = 2;

/// Flattens resource objects, resolving relationships against `included`
struct Resolver<'a> {
    /// type → id → object
    index: HashMap<&'a str, HashMap<&'a str, &'a ResourceObject>>,
}

impl<'a> Resolver<'a> {
    fn new(included: &'a [ResourceObject]) -> Self {
        let mut index: HashMap<&'a str, HashMap<&'a str, &'a ResourceObject>> = HashMap::new();
        for obj in included {
            index
                .entry(obj.kind.as_str())
                .or_default()
                .insert(obj.id.as_str(), obj);
        }
        Self { index }
    }

    fn lookup(&self, ident: &ResourceIdentifier) -> Option<&'a ResourceObject> {
        self.index
            .get(ident.kind.as_str())?
            .get(ident.id.as_str())
            .copied()
    }

    fn contains(&self, ident: &ResourceIdentifier) -> bool {
        self.lookup(ident).is_some()
    }

    /// Expand `obj` at `depth` (the primary object is 0). Relationships of
    /// objects at [`MAX_INCLUDE_DEPTH`] stay id stubs, so each included
    /// object is copied a bounded number of times however the graph links.
    /// `path` holds the objects currently being expanded; a reference back
    /// to one of them is a stub as well.
    fn flatten(
        &self,
        obj: &'a ResourceObject,
        depth: usize,
        path: &mut Vec<(&'a str, &'a str)>,
    ) -> Value {
        let mut map = obj.attributes.clone();
        map.insert("id".to_string(), Value::String(obj.id.clone()));
        if let Some(links) = &obj.links {
            map.entry("links").or_insert_with(|| links.clone());
        }

        path.push((obj.kind.as_str(), obj.id.as_str()));
        for (name, relationship) in &obj.relationships {
            let resolved = match linkage_of(relationship) {
                Some(Linkage::One(ident)) => self.resolve(&ident, depth + 1, path),
                Some(Linkage::Many(idents)) => Value::Array(
                    idents
                        .iter()
                        .map(|ident| self.resolve(ident, depth + 1, path))
                        .collect(),
                ),
                None => continue,
            };
            map.insert(name.clone(), resolved);
        }
        path.pop();

        Value::Object(map)
    }

    fn resolve(
        &self,
        ident: &ResourceIdentifier,
        depth: usize,
        path: &mut Vec<(&'a str, &'a str)>,
    ) -> Value {
        let on_path = path
            .iter()
            .any(|(kind, id)| *kind == ident.kind && *id == ident.id);
        match self.lookup(ident) {
            Some(obj) if !on_path && depth <= MAX_INCLUDE_DEPTH => {
                self.flatten(obj, depth, path)
            }
            _ => serde_json::json!({ "id": ident.id }),
        }
    }

    /// Every relationship named in `required` must resolve to included resources
    fn check_required(&self, obj: &ResourceObject, required: &[String]) -> Result<()> {
        for name in required {
            let Some(relationship) = obj.relationships.get(name) else {
                continue;
            };
            let missing = match linkage_of(relationship) {
                Some(Linkage::One(ident)) => (!self.contains(&ident)).then_some(ident),
                Some(Linkage::Many(idents)) => idents.into_iter().find(|i| !self.contains(i)),
                None => None,
            };
            if let Some(ident) = missing {
                return Err(TfeError::Decode {
                    message: format!(
                        "included resource {} '{}' for relationship '{}' of {} '{}' is missing",
                        ident.kind, ident.id, name, obj.kind, obj.id
                    ),
                    body: String::new(),
                });
            }
        }
        Ok(())
    }
}

/// Relationship names to check, derived from `include` values:
/// `current_run.plan` → `current-run`
pub(crate) fn required_relationships<S: AsRef<str>>(includes: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    includes
        .iter()
        .filter_map(|inc| inc.as_ref().split('.').next())
        .filter(|name| !name.is_empty())
        .map(|name| name.replace('_', "-"))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn parse_document(body: &[u8]) -> Result<Document> {
    serde_json::from_slice(body).map_err(|e| TfeError::decode(e, body))
}

fn into_typed<T: DeserializeOwned>(value: Value, body: &[u8]) -> Result<T> {
    serde_json::from_value(value).map_err(|e| TfeError::decode(e, body))
}

/// Decode a single-resource document into `T`
pub fn decode_one<T: DeserializeOwned>(body: &[u8], required: &[String]) -> Result<T> {
    let doc = parse_document(body)?;
    let resolver = Resolver::new(&doc.included);

    let obj = match &doc.data {
        Some(PrimaryData::One(obj)) => obj,
        Some(PrimaryData::Many(_)) => {
            return Err(TfeError::Decode {
                message: "expected a single resource, got an array".to_string(),
                body: String::from_utf8_lossy(body).into_owned(),
            })
        }
        None => {
            return Err(TfeError::Decode {
                message: "response has no primary data".to_string(),
                body: String::from_utf8_lossy(body).into_owned(),
            })
        }
    };

    resolver.check_required(obj, required)?;
    let flat = resolver.flatten(obj, 0, &mut Vec::new());
    debug!("Decoded {} '{}'", obj.kind, obj.id);
    into_typed(flat, body)
}

/// Decode a collection document into items plus its pagination envelope
pub fn decode_list<T: DeserializeOwned>(body: &[u8], required: &[String]) -> Result<ListResponse<T>> {
    let doc = parse_document(body)?;
    let resolver = Resolver::new(&doc.included);

    let objects: Vec<&ResourceObject> = match &doc.data {
        Some(PrimaryData::Many(objs)) => objs.iter().collect(),
        Some(PrimaryData::One(_)) => {
            return Err(TfeError::Decode {
                message: "expected an array of resources, got a single object".to_string(),
                body: String::from_utf8_lossy(body).into_owned(),
            })
        }
        None => Vec::new(),
    };

    let mut items = Vec::with_capacity(objects.len());
    for obj in objects {
        resolver.check_required(obj, required)?;
        items.push(into_typed(resolver.flatten(obj, 0, &mut Vec::new()), body)?);
    }

    let pagination = doc.meta.and_then(|m| m.pagination);
    debug!(
        "Decoded {} items (page {:?})",
        items.len(),
        pagination.as_ref().map(|p| p.current_page)
    );
    Ok(ListResponse { items, pagination })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Default)]
    #[serde(rename_all = "kebab-case")]
    struct TestOptions {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<Nullable<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        auto_apply: Option<bool>,
        #[serde(skip)]
        project_id: Option<String>,
    }

    impl Payload for TestOptions {
        fn resource_type(&self) -> &'static str {
            "workspaces"
        }

        fn relationships(&self) -> Vec<(&'static str, Relation)> {
            self.project_id
                .iter()
                .map(|id| ("project", Relation::one("projects", id.clone())))
                .collect()
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default, rename_all = "kebab-case")]
    struct TestWorkspace {
        id: String,
        name: String,
        current_run: Option<Box<TestRun>>,
        organization: Option<Box<TestOrg>>,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default, rename_all = "kebab-case")]
    struct TestRun {
        id: String,
        status: String,
        workspace: Option<Box<TestWorkspace>>,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    struct TestOrg {
        id: String,
        email: String,
    }

    #[test]
    fn test_encode_omits_unset_fields() {
        let opts = TestOptions {
            name: "ws".to_string(),
            ..Default::default()
        };
        let body = encode(&opts).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "data": { "type": "workspaces", "attributes": { "name": "ws" } }
            })
        );
    }

    #[test]
    fn test_encode_null_vs_value_vs_absent() {
        let cleared = TestOptions {
            name: "ws".to_string(),
            description: Some(Nullable::Null),
            auto_apply: Some(false),
            ..Default::default()
        };
        let body = encode(&cleared).unwrap();
        let attrs = &body["data"]["attributes"];
        assert!(attrs.get("description").unwrap().is_null());
        assert_eq!(attrs["auto-apply"], false);

        let set = TestOptions {
            name: "ws".to_string(),
            description: Some("hello".to_string().into()),
            ..Default::default()
        };
        let body = encode(&set).unwrap();
        assert_eq!(body["data"]["attributes"]["description"], "hello");
        assert!(body["data"]["attributes"].get("auto-apply").is_none());
    }

    #[test]
    fn test_encode_relationships() {
        let opts = TestOptions {
            name: "ws".to_string(),
            project_id: Some("prj-1".to_string()),
            ..Default::default()
        };
        let body = encode(&opts).unwrap();
        assert_eq!(
            body["data"]["relationships"],
            serde_json::json!({ "project": { "data": { "type": "projects", "id": "prj-1" } } })
        );
        // relationship fields never leak into attributes
        assert!(body["data"]["attributes"].get("project-id").is_none());
    }

    #[test]
    fn test_relation_null_and_many() {
        assert_eq!(Relation::Null.to_value(), serde_json::json!({ "data": null }));
        assert_eq!(
            Relation::many("users", ["user-1", "user-2"]).to_value(),
            serde_json::json!({ "data": [
                { "type": "users", "id": "user-1" },
                { "type": "users", "id": "user-2" }
            ] })
        );
    }

    #[test]
    fn test_decode_one_resolves_included() {
        let body = serde_json::json!({
            "data": {
                "id": "ws-1",
                "type": "workspaces",
                "attributes": { "name": "prod" },
                "relationships": {
                    "current-run": { "data": { "id": "run-1", "type": "runs" } },
                    "organization": { "data": { "id": "acme", "type": "organizations" } }
                }
            },
            "included": [
                {
                    "id": "run-1",
                    "type": "runs",
                    "attributes": { "status": "applied" },
                    "relationships": {
                        "workspace": { "data": { "id": "ws-1", "type": "workspaces" } }
                    }
                }
            ]
        });
        let ws: TestWorkspace =
            decode_one(body.to_string().as_bytes(), &[]).unwrap();
        assert_eq!(ws.id, "ws-1");
        assert_eq!(ws.name, "prod");

        let run = ws.current_run.unwrap();
        assert_eq!(run.status, "applied");
        // back-reference to the primary object is a stub, not a cycle
        let back = run.workspace.unwrap();
        assert_eq!(back.id, "ws-1");
        assert!(back.current_run.is_none());

        // not included: id only
        let org = ws.organization.unwrap();
        assert_eq!(org.id, "acme");
        assert!(org.email.is_empty());
    }

    #[test]
    fn test_decode_nested_include_two_levels() {
        let body = serde_json::json!({
            "data": {
                "id": "ws-1",
                "type": "workspaces",
                "attributes": { "name": "prod" },
                "relationships": {
                    "current-run": { "data": { "id": "run-1", "type": "runs" } }
                }
            },
            "included": [
                {
                    "id": "run-1",
                    "type": "runs",
                    "attributes": { "status": "planned" },
                    "relationships": { "plan": { "data": { "id": "plan-1", "type": "plans" } } }
                },
                {
                    "id": "plan-1",
                    "type": "plans",
                    "attributes": { "status": "finished" },
                    "relationships": { "run": { "data": { "id": "run-1", "type": "runs" } } }
                }
            ]
        });
        let ws: Value = decode_one(body.to_string().as_bytes(), &[]).unwrap();
        let plan = &ws["current-run"]["plan"];
        assert_eq!(plan["status"], "finished");
        assert_eq!(plan["run"], serde_json::json!({ "id": "run-1" }));
    }

    #[test]
    fn test_decode_cross_linked_included_stays_bounded() {
        let k = 12;
        let team_ids: Vec<_> = (0..k)
            .map(|i| serde_json::json!({ "id": format!("team-{}", i), "type": "teams" }))
            .collect();
        let membership_ids: Vec<_> = (0..k)
            .map(|i| serde_json::json!({ "id": format!("ou-{}", i), "type": "organization-memberships" }))
            .collect();

        let mut included = Vec::new();
        for i in 0..k {
            included.push(serde_json::json!({
                "id": format!("team-{}", i),
                "type": "teams",
                "attributes": { "name": format!("team-{}", i) },
                "relationships": { "organization-memberships": { "data": membership_ids } }
            }));
        }
        for i in 1..k {
            included.push(serde_json::json!({
                "id": format!("ou-{}", i),
                "type": "organization-memberships",
                "attributes": { "email": format!("user{}@example.com", i) },
                "relationships": { "teams": { "data": team_ids } }
            }));
        }
        let body = serde_json::json!({
            "data": {
                "id": "ou-0",
                "type": "organization-memberships",
                "attributes": { "email": "user0@example.com" },
                "relationships": { "teams": { "data": team_ids } }
            },
            "included": included
        });

        let membership: Value = decode_one(body.to_string().as_bytes(), &[]).unwrap();
        let team = &membership["teams"][3];
        assert_eq!(team["name"], "team-3");
        // back-reference to the primary object
        assert_eq!(team["organization-memberships"][0], serde_json::json!({ "id": "ou-0" }));
        let other = &team["organization-memberships"][5];
        assert_eq!(other["email"], "user5@example.com");
        // third level is ids only
        assert_eq!(other["teams"][7], serde_json::json!({ "id": "team-7" }));

        let flattened = membership.to_string().len();
        assert!(flattened < 200_000, "flattened to {} bytes", flattened);
    }

    #[test]
    fn test_decode_null_relationship_stays_none() {
        let body = serde_json::json!({
            "data": {
                "id": "ws-1",
                "type": "workspaces",
                "attributes": { "name": "prod" },
                "relationships": {
                    "current-run": { "data": null },
                    "organization": { "links": { "related": "/api/v2/organizations/acme" } }
                }
            }
        });
        let ws: TestWorkspace = decode_one(body.to_string().as_bytes(), &[]).unwrap();
        assert!(ws.current_run.is_none());
        assert!(ws.organization.is_none());
    }

    #[test]
    fn test_decode_required_include_missing() {
        let body = serde_json::json!({
            "data": {
                "id": "ws-1",
                "type": "workspaces",
                "attributes": { "name": "prod" },
                "relationships": {
                    "current-run": { "data": { "id": "run-1", "type": "runs" } }
                }
            }
        });
        let required = required_relationships(&["current_run"]);
        let result = decode_one::<TestWorkspace>(body.to_string().as_bytes(), &required);
        assert!(matches!(result, Err(TfeError::Decode { .. })));
    }

    #[test]
    fn test_decode_list_with_pagination() {
        let body = serde_json::json!({
            "data": [
                { "id": "ws-1", "type": "workspaces", "attributes": { "name": "a" } },
                { "id": "ws-2", "type": "workspaces", "attributes": { "name": "b" } }
            ],
            "meta": {
                "pagination": {
                    "current-page": 2,
                    "prev-page": 1,
                    "next-page": null,
                    "total-pages": 2,
                    "total-count": 22
                }
            }
        });
        let list: ListResponse<TestWorkspace> =
            decode_list(body.to_string().as_bytes(), &[]).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].name, "b");
        let page = list.pagination.unwrap();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.previous_page, Some(1));
        assert_eq!(page.next_page, None);
        assert_eq!(page.total_count, 22);
    }

    #[test]
    fn test_decode_list_without_meta() {
        let body = serde_json::json!({ "data": [] });
        let list: ListResponse<TestWorkspace> =
            decode_list(body.to_string().as_bytes(), &[]).unwrap();
        assert!(list.items.is_empty());
        assert!(list.pagination.is_none());
    }

    #[test]
    fn test_decode_malformed_body() {
        let result = decode_one::<TestWorkspace>(b"<html>oops</html>", &[]);
        match result {
            Err(TfeError::Decode { body, .. }) => assert!(body.contains("oops")),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let body = serde_json::json!({ "data": [] });
        let result = decode_one::<TestWorkspace>(body.to_string().as_bytes(), &[]);
        assert!(matches!(result, Err(TfeError::Decode { .. })));
    }

    #[test]
    fn test_required_relationships_normalizes() {
        assert_eq!(
            required_relationships(&["current_run", "current_run.plan", "organization"]),
            vec!["current-run".to_string(), "organization".to_string()]
        );
    }
}
