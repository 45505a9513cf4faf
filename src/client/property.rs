//! Property sub-resources of nodes and relationships:
//! `<entity>/<id>/properties[/<key>]`.

use serde_json::Value as Json;

use super::{check_value, properties_body, require_non_empty, RestClient};
use crate::model::{EntityRef, PropertyMap, Value};
use crate::transport::{Method, Request, Transport};
use crate::uri::join;
use crate::{Error, Result};

impl<T: Transport> RestClient<T> {
    async fn properties_uri(&self, entity: EntityRef, key: Option<&str>) -> Result<String> {
        let root = self.service_root().await?;
        let base = format!("{}/properties", Self::entity_uri(&root, entity));
        Ok(match key {
            Some(key) => join(&base, &[key]),
            None => base,
        })
    }

    /// All properties of a node or relationship.
    pub async fn get_properties(&self, entity: impl Into<EntityRef>) -> Result<PropertyMap> {
        let entity = entity.into();
        let uri = self.properties_uri(entity, None).await?;
        let reply = self
            .call(Request::new(Method::Get, uri), &[200, 204])
            .await
            .map_err(|e| e.or_not_found(|| entity.to_string()))?;
        if reply.status == 204 {
            return Ok(PropertyMap::new());
        }

        match reply.json()? {
            Json::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
            other => Err(Error::MalformedResponse(format!("properties of {entity} are not an object: {other}"))),
        }
    }

    /// Replace every property of a node or relationship with `properties`.
    pub async fn set_properties(&self, entity: impl Into<EntityRef>, properties: PropertyMap) -> Result<()> {
        let body = properties_body(&properties)?;
        let uri = self.properties_uri(entity.into(), None).await?;
        self.call(Request::new(Method::Put, uri).with_body(body), &[204]).await?;
        Ok(())
    }

    /// Remove every property.
    pub async fn clear_properties(&self, entity: impl Into<EntityRef>) -> Result<()> {
        let uri = self.properties_uri(entity.into(), None).await?;
        self.call(Request::new(Method::Delete, uri), &[204]).await?;
        Ok(())
    }

    /// One property. A missing key (or entity) is `NotFound`.
    pub async fn get_property(&self, entity: impl Into<EntityRef>, key: &str) -> Result<Value> {
        require_non_empty("property key", key)?;
        let entity = entity.into();
        let uri = self.properties_uri(entity, Some(key)).await?;
        let reply = self
            .call(Request::new(Method::Get, uri), &[200])
            .await
            .map_err(|e| e.or_not_found(|| format!("property '{key}' of {entity}")))?;
        Ok(Value::from(reply.json()?))
    }

    pub async fn set_property(&self, entity: impl Into<EntityRef>, key: &str, value: impl Into<Value>) -> Result<()> {
        require_non_empty("property key", key)?;
        let value = value.into();
        check_value(key, &value)?;
        let uri = self.properties_uri(entity.into(), Some(key)).await?;
        self.call(Request::new(Method::Put, uri).with_body(Json::from(value)), &[204]).await?;
        Ok(())
    }

    pub async fn delete_property(&self, entity: impl Into<EntityRef>, key: &str) -> Result<()> {
        require_non_empty("property key", key)?;
        let uri = self.properties_uri(entity.into(), Some(key)).await?;
        self.call(Request::new(Method::Delete, uri), &[204]).await?;
        Ok(())
    }
}
