//! SEMI message type models
//!
//! Type models for the situation data exchange messages used between
//! connected vehicles and the situation data warehouse: service
//! request/response, data request, data acceptance/receipt, advisory
//! situation data and its bundled distribution. The models drive the generic PER and XER codecs in
//! `perxer-asn1`; nothing here encodes or decodes by itself.
//!
//! [`all_types`] lists the message types in the order the guess engine tries
//! them. Because `DataAcceptance` and `DataReceipt` have the same layout, any
//! input valid under one decodes under the other and the earlier entry wins.

use std::sync::Arc;

use perxer_core::TypeModel;

pub mod common;
pub mod messages;

pub use messages::{
    advisory_situation_data, advisory_situation_data_distribution, data_acceptance, data_receipt,
    data_request, service_request, service_response,
};

/// Every supplied message type, in guessing order
pub fn all_types() -> Vec<Arc<TypeModel>> {
    vec![
        service_request().into_shared(),
        service_response().into_shared(),
        data_request().into_shared(),
        data_acceptance().into_shared(),
        data_receipt().into_shared(),
        advisory_situation_data().into_shared(),
        advisory_situation_data_distribution().into_shared(),
    ]
}

/// Look a message type up by its ASN.1 name
pub fn by_name(name: &str) -> Option<Arc<TypeModel>> {
    all_types().into_iter().find(|ty| ty.name() == name)
}
