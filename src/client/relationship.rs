//! Relationship resources.

use serde_json::{json, Value as Json};
use tracing::warn;

use super::document::decode_relationship;
use super::{properties_body, require_non_empty, RestClient};
use crate::model::{Direction, EntityRef, NodeId, PropertyMap, RelId, Relationship};
use crate::transport::{Method, Request, Transport};
use crate::{Error, Result};

impl<T: Transport> RestClient<T> {
    /// Create a `rel_type` relationship from `src` to `dst`.
    pub async fn create_relationship(
        &self,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        data: PropertyMap,
    ) -> Result<Relationship> {
        require_non_empty("relationship type", rel_type)?;
        let data = properties_body(&data)?;
        let root = self.service_root().await?;

        let body = json!({
            "to": Self::entity_uri(&root, EntityRef::Node(dst)),
            "type": rel_type,
            "data": data,
        });
        let uri = format!("{}/relationships", Self::entity_uri(&root, EntityRef::Node(src)));
        let rel = decode_relationship(self.call(Request::new(Method::Post, uri).with_body(body), &[201]).await?.json()?)?;

        if rel.src != src || rel.dst != dst {
            warn!(%src, %dst, returned_src = %rel.src, returned_dst = %rel.dst, "relationship endpoints mismatch");
            return Err(Error::ConsistencyViolation(format!(
                "created {src}->{dst} but server returned {}->{}", rel.src, rel.dst
            )));
        }
        Ok(rel)
    }

    /// Fetch a relationship. A missing relationship is `NotFound`.
    pub async fn get_relationship(&self, id: RelId) -> Result<Relationship> {
        let root = self.service_root().await?;
        let uri = Self::entity_uri(&root, EntityRef::Relationship(id));
        let reply = self
            .call(Request::new(Method::Get, &uri), &[200])
            .await
            .map_err(|e| e.or_not_found(|| format!("relationship {id}")))?;

        let rel = decode_relationship(reply.json()?)?;
        if rel.id != id {
            warn!(requested = %id, returned = %rel.id, "relationship id mismatch");
            return Err(Error::ConsistencyViolation(format!(
                "requested relationship {id} but {uri} returned relationship {}", rel.id
            )));
        }
        Ok(rel)
    }

    pub async fn delete_relationship(&self, id: RelId) -> Result<()> {
        let root = self.service_root().await?;
        let uri = Self::entity_uri(&root, EntityRef::Relationship(id));
        self.call(Request::new(Method::Delete, uri), &[204]).await?;
        Ok(())
    }

    /// Relationships attached to `node` in one direction.
    pub async fn relationships_of(&self, node: NodeId, direction: Direction) -> Result<Vec<Relationship>> {
        let root = self.service_root().await?;
        let uri = format!(
            "{}/relationships/{}",
            Self::entity_uri(&root, EntityRef::Node(node)),
            direction.as_segment()
        );
        self.call(Request::new(Method::Get, uri), &[200])
            .await?
            .array()?
            .into_iter()
            .map(decode_relationship)
            .collect()
    }

    pub async fn incoming_relationships(&self, node: NodeId) -> Result<Vec<Relationship>> {
        self.relationships_of(node, Direction::Incoming).await
    }

    pub async fn outgoing_relationships(&self, node: NodeId) -> Result<Vec<Relationship>> {
        self.relationships_of(node, Direction::Outgoing).await
    }

    /// Every relationship type the server knows about.
    pub async fn relationship_types(&self) -> Result<Vec<String>> {
        let root = self.service_root().await?;
        let request = Request::new(Method::Get, &root.relationship_types);
        self.call(request, &[200])
            .await?
            .array()?
            .into_iter()
            .map(|t| match t {
                Json::String(s) => Ok(s),
                other => Err(Error::MalformedResponse(format!("relationship type is not a string: {other}"))),
            })
            .collect()
    }
}
