/*!
 * Transport of a generated document from the intake form to the result session.
 *
 * A `Handoff` is the typed payload. For navigation it is flattened into a
 * form-urlencoded query carrying two parameters:
 * - `data`: the document as JSON
 * - `inputs`: the original brief as JSON, an opaque context for refinement
 *
 * Decoding never panics: a missing `data` parameter and a payload that does not
 * describe a document are reported as distinct `DeserializationError`s.
 */

use url::form_urlencoded;

use crate::errors::DeserializationError;
use crate::model::{Brief, ScriptDocument};

/// Query parameter holding the serialized document
pub const DATA_PARAM: &str = "data";

/// Query parameter holding the opaque brief context
pub const INPUTS_PARAM: &str = "inputs";

/// A generated document on its way to a result session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub document: ScriptDocument,
    /// Best-effort description of the brief that produced the document
    pub original_inputs: Option<String>,
}

impl Handoff {
    pub fn new(document: ScriptDocument, original_inputs: Option<String>) -> Self {
        Self {
            document,
            original_inputs,
        }
    }

    /// Handoff for a freshly generated document, carrying the brief as context
    pub fn from_generation(document: ScriptDocument, brief: &Brief) -> Self {
        Self::new(document, Some(brief.to_context()))
    }

    /// Encode as a query string (without the leading `?`)
    pub fn to_query(&self) -> Result<String, serde_json::Error> {
        let data = serde_json::to_string(&self.document)?;
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair(DATA_PARAM, &data);
        if let Some(inputs) = &self.original_inputs {
            query.append_pair(INPUTS_PARAM, inputs);
        }
        Ok(query.finish())
    }

    /// Navigation target for the results view, e.g. `/results?data=...`
    pub fn to_location(&self, results_path: &str) -> Result<String, serde_json::Error> {
        Ok(format!("{}?{}", results_path, self.to_query()?))
    }
}

/// Raw parameters received by the results view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationParams {
    pub data: Option<String>,
    pub inputs: Option<String>,
}

impl NavigationParams {
    /// Parse a location (`/results?data=..`, a full URL) or a bare query string.
    /// A fragment is ignored and the first occurrence of each parameter wins.
    pub fn parse(location: &str) -> Self {
        let without_fragment = location.split('#').next().unwrap_or_default();
        let query = match without_fragment.split_once('?') {
            Some((_, query)) => query,
            // No `?`: treat the whole thing as a query only if it looks like one
            None if without_fragment.contains('=') => without_fragment,
            None => "",
        };

        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                DATA_PARAM if params.data.is_none() => params.data = Some(value.into_owned()),
                INPUTS_PARAM if params.inputs.is_none() => params.inputs = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Parameters for a handoff, as if they had gone through navigation
    pub fn from_handoff(handoff: &Handoff) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: Some(serde_json::to_string(&handoff.document)?),
            inputs: handoff.original_inputs.clone(),
        })
    }
}

/// Decode the document carried by navigation parameters
pub fn decode_document(params: &NavigationParams) -> Result<ScriptDocument, DeserializationError> {
    let data = params
        .data
        .as_deref()
        .filter(|data| !data.trim().is_empty())
        .ok_or(DeserializationError::Missing)?;

    serde_json::from_str(data).map_err(|e| DeserializationError::Malformed(e.to_string()))
}

/// Decode a full handoff (document plus context) from navigation parameters
pub fn decode_handoff(params: &NavigationParams) -> Result<Handoff, DeserializationError> {
    let document = decode_document(params)?;
    Ok(Handoff::new(document, params.inputs.clone()))
}
