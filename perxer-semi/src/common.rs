//! Sub-types shared by several SEMI messages
//!
//! Every function builds a fresh model; callers that need one sub-type in
//! several places wrap it in an `Arc` once and clone the handle.

use std::sync::Arc;

use perxer_core::{Field, SizeConstraint, TypeModel, ValueRange};

/// Root identifiers of `SemiDialogID`, in declaration order
pub const DIALOG_IDS: [&str; 10] = [
    "vehSitData",
    "dataSubscription",
    "advSitDataDep",
    "advSitDatDist",
    "reserved1",
    "reserved2",
    "objReg",
    "objDisc",
    "intersectionSitDataDep",
    "intersectionSitDataQuery",
];

/// Root identifiers of `SemiSequenceID`, in declaration order
pub const SEQUENCE_IDS: [&str; 10] = [
    "svcReq",
    "svcResp",
    "dataReq",
    "dataConf",
    "data",
    "accept",
    "receipt",
    "subscriptionReq",
    "subscriptionResp",
    "subscriptionCancel",
];

pub fn semi_dialog_id() -> TypeModel {
    TypeModel::extensible_enumerated("SemiDialogID", &DIALOG_IDS, &[])
}

pub fn semi_sequence_id() -> TypeModel {
    TypeModel::extensible_enumerated("SemiSequenceID", &SEQUENCE_IDS, &[])
}

/// `TemporaryID ::= OCTET STRING (SIZE(4))`
pub fn temporary_id() -> TypeModel {
    TypeModel::octet_string("TemporaryID", SizeConstraint::fixed(4))
}

/// `GroupID ::= TemporaryID`
pub fn group_id() -> TypeModel {
    temporary_id().renamed("GroupID")
}

pub fn sha256_hash() -> TypeModel {
    TypeModel::octet_string("Sha256Hash", SizeConstraint::fixed(32))
}

pub fn distribution_type() -> TypeModel {
    TypeModel::octet_string("DistributionType", SizeConstraint::fixed(1))
}

/// The four components every SEMI message starts with
pub fn header_fields() -> Vec<Field> {
    let temporary_id = temporary_id().into_shared();
    vec![
        Field::new("dialogID", semi_dialog_id()),
        Field::new("seqID", semi_sequence_id()),
        Field::new("groupID", group_id()),
        Field::new("requestID", temporary_id),
    ]
}

pub fn ip_address() -> TypeModel {
    TypeModel::choice(
        "IpAddress",
        vec![
            Field::new(
                "ipv4Address",
                TypeModel::octet_string("IPv4Address", SizeConstraint::fixed(4)),
            ),
            Field::new(
                "ipv6Address",
                TypeModel::octet_string("IPv6Address", SizeConstraint::fixed(16)),
            ),
        ],
        false,
    )
}

pub fn connection_point() -> TypeModel {
    TypeModel::sequence(
        "ConnectionPoint",
        vec![
            Field::optional("address", ip_address()),
            Field::new("port", TypeModel::integer("PortNumber", ValueRange::new(0, 65535))),
        ],
        false,
    )
}

/// `RegionalExtension`; the open-type payload is carried as raw octets
pub fn regional_extension() -> TypeModel {
    TypeModel::sequence(
        "RegionalExtension",
        vec![
            Field::new("regionId", TypeModel::integer("RegionId", ValueRange::new(0, 255))),
            Field::new(
                "regExtValue",
                TypeModel::octet_string("RegExtValue", SizeConstraint::default()),
            ),
        ],
        false,
    )
}

pub fn position_3d() -> TypeModel {
    TypeModel::sequence(
        "Position3D",
        vec![
            Field::new(
                "lat",
                TypeModel::integer("Latitude", ValueRange::new(-900_000_000, 900_000_001)),
            ),
            Field::new(
                "long",
                TypeModel::integer("Longitude", ValueRange::new(-1_799_999_999, 1_800_000_001)),
            ),
            Field::optional(
                "elevation",
                TypeModel::integer("Elevation", ValueRange::new(-4096, 61439)),
            ),
            Field::optional(
                "regional",
                TypeModel::sequence_of(
                    "Position3DRegional",
                    regional_extension(),
                    SizeConstraint::range(1, 4),
                ),
            ),
        ],
        true,
    )
}

pub fn geo_region() -> TypeModel {
    let corner: Arc<TypeModel> = position_3d().into_shared();
    TypeModel::sequence(
        "GeoRegion",
        vec![
            Field::new("nwCorner", corner.clone()),
            Field::new("seCorner", corner),
        ],
        false,
    )
}

fn year() -> TypeModel {
    TypeModel::integer("DYear", ValueRange::new(0, 4095))
}

fn month() -> TypeModel {
    TypeModel::integer("DMonth", ValueRange::new(0, 12))
}

fn day() -> TypeModel {
    TypeModel::integer("DDay", ValueRange::new(0, 31))
}

fn hour() -> TypeModel {
    TypeModel::integer("DHour", ValueRange::new(0, 31))
}

fn minute() -> TypeModel {
    TypeModel::integer("DMinute", ValueRange::new(0, 60))
}

/// Date and time with every component optional
pub fn d_date_time() -> TypeModel {
    TypeModel::sequence(
        "DDateTime",
        vec![
            Field::optional("year", year()),
            Field::optional("month", month()),
            Field::optional("day", day()),
            Field::optional("hour", hour()),
            Field::optional("minute", minute()),
            Field::optional("second", TypeModel::integer("DSecond", ValueRange::new(0, 65535))),
            Field::optional("offset", TypeModel::integer("DOffset", ValueRange::new(-840, 840))),
        ],
        false,
    )
}

/// Date and time down to the minute, all components present
pub fn d_full_time() -> TypeModel {
    TypeModel::sequence(
        "DFullTime",
        vec![
            Field::new("year", year()),
            Field::new("month", month()),
            Field::new("day", day()),
            Field::new("hour", hour()),
            Field::new("minute", minute()),
        ],
        false,
    )
}

pub fn time_to_live() -> TypeModel {
    TypeModel::enumerated(
        "TimeToLive",
        &["minute", "halfHour", "day", "week", "month", "year"],
    )
}

pub fn advisory_broadcast_type() -> TypeModel {
    TypeModel::extensible_enumerated(
        "AdvisoryBroadcastType",
        &["spatAggregate", "map", "tim", "ev"],
        &[],
    )
}

pub fn advisory_details() -> TypeModel {
    let full_time = d_full_time().into_shared();
    TypeModel::sequence(
        "AdvisoryDetails",
        vec![
            Field::new("asdmID", temporary_id()),
            Field::new("asdmType", advisory_broadcast_type()),
            Field::new("distType", distribution_type()),
            Field::optional("startTime", full_time.clone()),
            Field::optional("stopTime", full_time),
            Field::new(
                "advisoryMessage",
                TypeModel::octet_string("AdvisoryMessage", SizeConstraint::range(0, 1400)),
            ),
        ],
        false,
    )
}

pub fn tx_mode() -> TypeModel {
    TypeModel::enumerated("TxMode", &["continuous", "alternating"])
}

pub fn tx_channel() -> TypeModel {
    TypeModel::enumerated(
        "TxChannel",
        &["chControl", "chService", "ch172", "ch174", "ch176", "ch178", "ch180", "ch182"],
    )
}

/// How a roadside unit should broadcast one advisory
pub fn broadcast_instructions() -> TypeModel {
    let full_time = d_full_time().into_shared();
    TypeModel::sequence(
        "BroadcastInstructions",
        vec![
            Field::new("biType", advisory_broadcast_type()),
            Field::new("biPriority", TypeModel::integer("BiPriority", ValueRange::new(0, 7))),
            Field::new("biTxMode", tx_mode()),
            Field::new("biTxChannel", tx_channel()),
            Field::new("biTxInterval", TypeModel::integer("BiTxInterval", ValueRange::new(1, 8))),
            Field::new("biDeliveryStart", full_time.clone()),
            Field::new("biDeliveryStop", full_time),
            Field::new("biSignature", TypeModel::boolean("BiSignature")),
            Field::new("biEncryption", TypeModel::boolean("BiEncryption")),
            Field::new(
                "biReserved",
                TypeModel::bit_string("BiReserved", SizeConstraint::fixed(11)),
            ),
        ],
        false,
    )
}

/// One distributed advisory: the payload plus where and how to send it
pub fn advisory_broadcast() -> TypeModel {
    TypeModel::sequence(
        "AdvisoryBroadcast",
        vec![
            Field::new(
                "messagePsid",
                TypeModel::octet_string("Psid", SizeConstraint::fixed(4)),
            ),
            Field::optional("broadcastInst", broadcast_instructions()),
            Field::new(
                "advisoryMessage",
                TypeModel::octet_string("AdvisoryMessage", SizeConstraint::range(0, 1400)),
            ),
        ],
        false,
    )
}

pub fn advisory_situation_bundle() -> TypeModel {
    TypeModel::sequence(
        "AdvisorySituationBundle",
        vec![
            Field::new(
                "bundleNumber",
                TypeModel::integer("BundleNumber", ValueRange::new(1, 64)),
            ),
            Field::new("bundleId", temporary_id()),
            Field::new(
                "asdRecords",
                TypeModel::sequence_of(
                    "AdvisoryBroadcastList",
                    advisory_broadcast(),
                    SizeConstraint::range(1, 10),
                ),
            ),
        ],
        false,
    )
}
