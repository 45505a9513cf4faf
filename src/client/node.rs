//! Node resources: `<node>` and `<node>/<id>`.

use tracing::warn;

use super::document::decode_node;
use super::{properties_body, RestClient};
use crate::model::{EntityRef, Node, NodeId, PropertyMap};
use crate::transport::{Method, Request, Transport};
use crate::{Error, Result};

impl<T: Transport> RestClient<T> {
    /// Create a node carrying `properties` (which may be empty).
    pub async fn create_node(&self, properties: PropertyMap) -> Result<Node> {
        let body = properties_body(&properties)?;
        let root = self.service_root().await?;
        let request = Request::new(Method::Post, &root.node).with_body(body);
        decode_node(self.call(request, &[201]).await?.json()?)
    }

    pub async fn create_empty_node(&self) -> Result<Node> {
        self.create_node(PropertyMap::new()).await
    }

    /// Fetch a node. A missing node is `NotFound`.
    pub async fn get_node(&self, id: NodeId) -> Result<Node> {
        let root = self.service_root().await?;
        let uri = Self::entity_uri(&root, EntityRef::Node(id));
        let reply = self
            .call(Request::new(Method::Get, &uri), &[200])
            .await
            .map_err(|e| e.or_not_found(|| format!("node {id}")))?;

        let node = decode_node(reply.json()?)?;
        if node.id != id {
            warn!(requested = %id, returned = %node.id, "node id mismatch");
            return Err(Error::ConsistencyViolation(format!(
                "requested node {id} but {uri} returned node {}", node.id
            )));
        }
        Ok(node)
    }

    /// Delete a node. Fails with status 409 while it still has relationships.
    pub async fn delete_node(&self, id: NodeId) -> Result<()> {
        let root = self.service_root().await?;
        let uri = Self::entity_uri(&root, EntityRef::Node(id));
        self.call(Request::new(Method::Delete, uri), &[204]).await?;
        Ok(())
    }
}
