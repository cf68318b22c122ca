//! Top-level SEMI messages

use perxer_core::{Field, SizeConstraint, TypeModel, ValueRange};

use crate::common::{
    advisory_details, advisory_situation_bundle, connection_point, d_date_time,
    distribution_type, geo_region, header_fields, sha256_hash, temporary_id, time_to_live,
};

fn message(name: &str, body: Vec<Field>) -> TypeModel {
    let mut fields = header_fields();
    fields.extend(body);
    TypeModel::sequence(name, fields, false)
}

/// Request for a service, optionally naming where the response should go
pub fn service_request() -> TypeModel {
    message(
        "ServiceRequest",
        vec![Field::optional("destination", connection_point())],
    )
}

pub fn service_response() -> TypeModel {
    message(
        "ServiceResponse",
        vec![
            Field::new("expiration", d_date_time()),
            Field::optional("serviceRegion", geo_region()),
            Field::new("hash", sha256_hash()),
        ],
    )
}

pub fn data_request() -> TypeModel {
    message(
        "DataRequest",
        vec![
            Field::new("serviceRegion", geo_region()),
            Field::optional("timeBound", TypeModel::integer("TimeBound", ValueRange::new(1, 2880))),
            Field::new("distType", distribution_type()),
        ],
    )
}

/// Acknowledges a data transfer; the header carries everything
pub fn data_acceptance() -> TypeModel {
    message("DataAcceptance", Vec::new())
}

/// Same layout as [`data_acceptance`]; only the sequence identifier differs on the wire
pub fn data_receipt() -> TypeModel {
    message("DataReceipt", Vec::new())
}

pub fn advisory_situation_data() -> TypeModel {
    message(
        "AdvisorySituationData",
        vec![
            Field::optional("recordID", temporary_id()),
            Field::optional("timeToLive", time_to_live()),
            Field::new("serviceRegion", geo_region()),
            Field::new("asdmDetails", advisory_details()),
        ],
    )
}

/// Advisories handed out by the warehouse, grouped into bundles
pub fn advisory_situation_data_distribution() -> TypeModel {
    message(
        "AdvisorySituationDataDistribution",
        vec![
            Field::new(
                "recordCount",
                TypeModel::integer("RecordCount", ValueRange::new(0, 400)),
            ),
            Field::new(
                "bundleCount",
                TypeModel::integer("BundleCount", ValueRange::new(0, 40)),
            ),
            Field::new(
                "asdBundles",
                TypeModel::sequence_of(
                    "AdvisorySituationBundleList",
                    advisory_situation_bundle(),
                    SizeConstraint::range(0, 4),
                ),
            ),
        ],
    )
}
