//! Transcoding and guessing against captured SEMI messages

use std::sync::Arc;

use perxer::codec::xer::XmlElement;
use perxer::format::{HexPer, PerFormat, RawXer};
use perxer::semi;
use perxer::{
    AbstractValue, CodecSettings, ErrorKind, Transcoder, TypeModel, guess_per_to_xer,
    guess_per_to_xer_with, guess_xer_to_per, per_to_xer, xer_to_per,
};

const SERVICE_REQUEST: &str = "8c 00 00 00 00 1c 0a 9c 43 6b 69 e0";
const SERVICE_RESPONSE: &str = "8c 20 00 00 00 1c 0a 9c 43 7f df 86 fb 30 80 08 9a 40 a4 f4 80 54 39 \
     a5 16 fe 22 05 6e 42 20 15 40 f7 b5 af fa aa e6 c7 53 45 3f fd 0a be 84 b6 86 7c f3 e8 fa b9 fa \
     83 3c 0d 49 39 0e a3 a7 15 16 69 00";
const DATA_REQUEST: &str =
    "0c 40 00 00 00 1c 0a 9c 43 62 93 d2 01 50 e6 94 5b f8 88 15 b9 08 80 55 03 de 04";
const DATA_ACCEPTANCE: &str = "19 40 00 00 00 38 15 38 86 c0";
const DATA_RECEIPT: &str = "19 80 00 00 00 38 15 38 86 c0";
const ADVISORY_SITUATION_DATA: &str = "444000000006615EC7C0283B90A7148D2B0A89C49F8A85A7763BFB30AF63E2107E16\
     0C6F7E210C6F0E00700DA003ED4E020B50DD93846D600000000001EEEBB360603D4E7C8A5A2A72E2D933D3AAAA200007E14B3\
     610002060FF15532F3E9A776741524CD80000010A9C76588E523E43D0BDDC0AF3000508418BE4C2E2A85F1FD71D02F907B8DF\
     17C825C718BE41AE3884300004027BBAECD800";
const ADVISORY_SITUATION_DATA_DISTRIBUTION: &str = "190000000038153886C1C12016E67A4BA600010006A327E1580747E15B874AA09250380820120001F811C2813137434D\
     48564554300004000000001F40100176521EFD9D76E2EBCEB45A8C2FE6E5BF6D7CBCFA09AECFA9E739EE2221F4100380\
     8004004000D0C4478374000000A326DC06A2002800000000000000000040416030D05D1D195B9D1A5BDB8B88151A1A5C\
     C81A5CC8185B88115B595C99D95B98DE48105B195C9D0B88151A195C99481A5CC818481A185E985C991BDD5CC81B585D\
     195C9A585B1CC81D1C9D58DAC81BDB88199A5C9948185A19585908185D0811DC9D58988814DD1C99595D0B88119BDC88\
     1E5BDD5C881CD859995D1E4B081B585AD9481848154B5D1D5C9B881B9BDDCB0B081BDC881D1D5C9B881B19599D081BDB\
     881CDBDD5D1A081B5A5B1B081CDD1C99595D081D1BC8195E1A5D081D1A1948185C99584B8140080004001A8C9F853EFE\
     5F854EFE6A8284C0E02080838007E0828A00C4DD0909591550C0C40010000000007D004015D87CDCB7EDAF979F4115EA\
     040CEE0B0D4C3E8238001001E4A9CA5153C3BB6AAEC466E5BF6CEDFCBA68115E8FB40EE07810C3E82078021040914444\
     043A1E101D4C4C02F702DC600000051936E069D00340000000000000000002020B018E82E8E8CADCE8D2DEDC5C40A8D0\
     D2E640D2E640C2DC408ADACAE4CECADCC6F24082D8CAE4E85C40B2DEEA40C2E4CA40C2E0E0E4DEC2C6D0D2DCCE40C240\
     C8C2DCCECAE4DEEAE640CEC2E640D8CAC2D640C2D0CAC2C840DEDC40A2EAD2DCC6F240A0D8C2C6CA5C408CDEE440F2DE\
     EAE440E6C2CCCAE8F25840E8EAE4DC40D8CACCE840C2E840E8D0CA40CCD2E4E6E840E6E8E4CACAE840D2DCE8CAE4E6CA\
     C6E8D2DEDC40C2D0CAC2C840C2DCC840CAF0D2E840E8D0CA40C2E4CAC240D2DADACAC8D2C2E8CAD8F25C0B4000000000\
     0000000042020B018082E8E8CADCE8D2DEDC5C40A8D0D2E640D2E640C2DC408ADACAE4CECADCC6F24082D8CAE4E85C40\
     A8D0CAE4CA40D2E640C240C8C2DCCECAE4DEEAE640CEC2E640D8CAC2D64062606040F2C2E4C8E640E8DE40E8D0CA40E4\
     D2CED0E840DEDC40A2EAD2DCC6F240A0D8C2C6CA5C408CDEE440F2DEEAE440E6C2CCCAE8F25840C8DE40DCDEE840E8EA\
     E4DC40DEDC40A2EAD2DCC6F240A0D8C2C6CA5C4086DEDCE8D2DCEACA40CEDED2DCCE40E6E8E4C2D2CED0E840DEDC408A\
     C6D6D2DCCEE8DEDC5C0A200010006A327E152D587E156558AA09850380820180001F817C28031365F44435F564554000\
     400004F741F40380176269D783C3872DF871E81334535D8F59863643202E0008E00000016C09A6508B604F3284000000\
     B0E36E04ED001448D159E2448D159C0C2020B025482DC40D2DAE0DEE4E8C2DCE840DACAE6E6C2CECA40CCE4DEDA40E8D\
     0CA408886408CD2E4CA4088CAE0C2E4E8DACADCE85C40A8D0CAE4CA40D2E640C240DAC2D4DEE440CCD2E4CA40EED2E8D\
     040E8DEF0D2C640E6DADED6CA40C2E840E8D0CA40A0DEE8DEDAC2C6409ACAE8E4DE40A6E8C2E8D2DEDC5C40A0DEE8C2D\
     AC2F040C2DCC840A0CADCDCE6F2D8ECC2DCD2C24082ECCADCEACAE640DCCAC2E440E8D0CA40E0DEE8DEDAC2C640DACAE\
     8E4DE40E6E8C2E8D2DEDC40C2E4CA40C6D8DEE6CAC840E8DE40C2D8D840E8E4C2CCCCD2C65C40A8DE40C2ECDED2C840E\
     8D0CA40E6DADED6CA5840C240C4E4CAC2E8D0D2DCCE40D0C2F4C2E4C85840F2DEEA40E6D0DEEAD8C840D0CAC2C840E6D\
     EEAE8D040E8DEEEC2E4C840E8D0CA4082DCC2DEE6E8D2C240A4D2ECCAE45C0A080004001A8C9F8522B75F8530B76A821\
     640E0158007D4D80000000C4DD11090D4D5CC4C0002CA2A9691B1DC21771880A60009124807D004005D8DA7626A0891A\
     120874EBA062C14552D6C83B842ED9101404B0FC0088400237284811B902800006352900860C4284420200010006A327\
     E152D627E156562AA0914038082010F001F810B2803137444256455430320004000000001F401001761F372DFB62E1E7\
     D04552FFCC3B8468EF0FA0801E040090BA1FD582B87402800000051936E033D00140000000000000000002020B017C82\
     E8E8CADCE8D2DEDC5C40A8D0D2E640D2E640C2DC408ADACAE4CECADCC6F24082D8CAE4E85C40A8D0CAE4CA40D2E640C2\
     40D0C2F4C2E4C8DEEAE640DAC2E8CAE4D2C2D8E640E8E4EAC6D640DEDC40CCD2E4CA40C2E8408CD8DEE4D2C8C24082EC\
     CADCEACA5C408CDEE440F2DEEAE440E6C2CCCAE8F25840DAC2D6CA40C240AA5AE8EAE4DC40DCDEEE585840DEE440E8EA\
     E4DC40D8CACCE840DEDC4090C2E4E4F240A8D0DEDAC2E640EEC2F240E8DE40CAF0D2E840E8D0CA40C2E4CAC25C0A0800\
     04001A8C9F86B91A1F86CB1A2A822100E020600007DF4804C4DD11095D5D14C0C0001C22A962361DC3FE37000C100000\
     7D00E001F84552C46C3B87FC6E0FA0807E00262096895187B9F7A33A63F2865007B6906E77DB060B47EB087FDE6822DD\
     A9847EB3609C368623E75A809A046211C45FC27D09685378FE0A5003425A909B1B21068016201304EEC328287A25E000\
     000380A00010006A327E14B81F7E14F01FAA091F038082011A001F81162813137444356455430310004000000001F401\
     0017620066E5BF6D7CBCFA099ACC70A7AC673FC1F411C000801540ABFE08A9A25FF7C000000A326DC06C200280000000\
     0000000000040416031D05D1D195B9D1A5BDB8B88151A1A5CC81A5CC8185B88115B595C99D95B98DE48105B195C9D0B8\
     8165BDD48185C9948185C1C1C9BD858DA1A5B99C8184819185B99D95C9BDD5CC819D85CC81B19585AC8185A195859081\
     BDB88145D5A5B98DE48141B1858D94B88119BDC881E5BDD5C881CD859995D1E4B081D1D5C9B881B19599D08185D081D1\
     A1948199A5C9CDD081CDD1C99595D081A5B9D195C9CD958DD1A5BDB88185A19585908185B9908195E1A5D081D1A19481\
     85C9958481A5B5B59591A585D195B1E4B8140080004001A8C9F86BB301F86CD302A8207151A1A5CC81A5CC8185B88185\
     91D9A5CDBDC9E481B595CDCD859D94BA00010006A327E148C847E14C484AA085F03805C001F596000000031374756435\
     3573031000B28E9D43907471B95E2028E000447B81F40100176329D89A823D6410E9D740C18A8E9DD50874728032203C\
     0961F001108117D9A6B020AFCAB059053689933000006352A00860C4A04420080004001A8C9F86BB305F86CD306A8207\
     151A1A5CC81A5CC8185B8818591D9A5CDBDC9E481B595CDCD859D94B815B99E92E380004001A8C9F8530315F853E316A\
     824580E02080444007E0434A04C4DD110D591550C0C80010000000007D004005D88CDCB7ED9DBF974D0266B3D541EB1E\
     F5887D0407002004DAA8748C271E64CD400000028C9B7019E800A0000000000000000001010580BE417474656E74696F\
     6E2E205468697320697320616E20456D657267656E637920416C6572742E20546865726520697320612068617A617264\
     6F7573206D6174657269616C7320747275636B206F6E206669726520617420466C6F72696461204176656E75652E2046\
     6F7220796F7572207361666574792C206D616B65206120552D7475726E206E6F772C2C206F72207475726E206C656674\
     206F6E2048617272792054686F6D61732077617920746F20657869742074686520617265612E0500200010006A327E1A\
     ECC07E1B34C0AA081C5468697320697320616E2061647669736F7279206D6573736167652E80004001A8C9F86BB301F8\
     6CD302A8207151A1A5CC81A5CC8185B8818591D9A5CDBDC9E481B595CDCD859D94BA00010006A327E19CC267E1A0C26A\
     A09250380820120001F811C2813137434D48564554310004000000001F40100176521EFD9D76E2EBCEB45A8C6FE6E5BF\
     6D7CBCFA09AFB0DEC7391A6D81F41001C08004004000D43B882108000000A326DC06A200280000000000000000004041\
     6030D05D1D195B9D1A5BDB8B88151A1A5CC81A5CC8185B88115B595C99D95B98DE48105B195C9D0B88151A195C99481A\
     5CC818481A185E985C991BDD5CC81B585D195C9A585B1CC81D1C9D58DAC81BDB88199A5C9948185A19585908185D0811\
     DC9D58988814DD1C99595D0B88119BDC881E5BDD5C881CD859995D1E4B081B585AD9481848154B5D1D5C9B881B9BDDCB\
     0B081BDC881D1D5C9B881B19599D081BDB881CDBDD5D1A081B5A5B1B081CDD1C99595D081D1BC8195E1A5D081D1A1948\
     185C99584B814000";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bytes(hex: &str) -> Vec<u8> {
    HexPer.to_internal(hex).unwrap()
}

/// Every captured vector with the name of the type it was produced from
fn vectors() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ServiceRequest", SERVICE_REQUEST),
        ("ServiceResponse", SERVICE_RESPONSE),
        ("DataRequest", DATA_REQUEST),
        ("DataAcceptance", DATA_ACCEPTANCE),
        ("DataReceipt", DATA_RECEIPT),
        ("AdvisorySituationData", ADVISORY_SITUATION_DATA),
        ("AdvisorySituationDataDistribution", ADVISORY_SITUATION_DATA_DISTRIBUTION),
    ]
}

fn model(name: &str) -> Arc<TypeModel> {
    semi::by_name(name).unwrap()
}

fn decode(name: &str, hex: &str) -> AbstractValue {
    Transcoder::default()
        .decode_per(&model(name), &bytes(hex))
        .unwrap()
}

fn int(value: &AbstractValue, path: &str) -> i64 {
    value
        .at_path(path)
        .and_then(AbstractValue::as_integer)
        .unwrap_or_else(|| panic!("no integer at {}", path))
}

fn octets(value: &AbstractValue, path: &str) -> String {
    value
        .at_path(path)
        .and_then(AbstractValue::as_octet_string)
        .map(hex::encode)
        .unwrap_or_else(|| panic!("no octet string at {}", path))
}

fn ident<'a>(value: &'a AbstractValue, path: &str) -> &'a str {
    value
        .at_path(path)
        .and_then(AbstractValue::as_enumerated)
        .unwrap_or_else(|| panic!("no enumerated at {}", path))
}

fn element_names(element: &XmlElement) -> Vec<String> {
    let mut names = vec![element.name.clone()];
    for child in &element.children {
        names.extend(element_names(child));
    }
    names
}

#[test]
fn test_each_vector_decodes_under_its_own_type() {
    init_logger();
    for (name, hex) in vectors() {
        let ty = model(name);
        let per = bytes(hex);
        let xml = per_to_xer(&ty, &per).unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert!(xml.starts_with(&format!("<{}>", name)), "{}", xml);
        assert_eq!(xer_to_per(&ty, &xml).unwrap(), per, "{} does not re-encode", name);
    }
}

#[test]
fn test_service_request_fields() {
    let value = decode("ServiceRequest", SERVICE_REQUEST);
    assert_eq!(ident(&value, "dialogID"), "advSitDatDist");
    assert_eq!(ident(&value, "seqID"), "svcReq");
    assert_eq!(octets(&value, "groupID"), "00000000");
    assert_eq!(octets(&value, "requestID"), "e054e21b");
    assert_eq!(int(&value, "destination/port"), 46750);
    assert!(value.at_path("destination/address").is_none());
}

#[test]
fn test_service_response_fields() {
    let value = decode("ServiceResponse", SERVICE_RESPONSE);
    assert_eq!(ident(&value, "seqID"), "svcResp");
    let expiration: Vec<i64> = ["year", "month", "day", "hour", "minute", "second", "offset"]
        .iter()
        .map(|f| int(&value, &format!("expiration/{}", f)))
        .collect();
    assert_eq!(expiration, [2017, 11, 29, 19, 2, 34, 0]);
    assert_eq!(int(&value, "serviceRegion/nwCorner/lat"), 483_743_530);
    assert_eq!(int(&value, "serviceRegion/nwCorner/long"), -1_316_439_680);
    assert_eq!(int(&value, "serviceRegion/seCorner/lat"), 241_562_500);
    assert_eq!(int(&value, "serviceRegion/seCorner/long"), -723_472_400);
    assert_eq!(
        octets(&value, "hash"),
        "6b5ff555cd8ea68a7ffa157d096d0cf9e7d1f573f506781a92721d474e2a2cd2"
    );
}

#[test]
fn test_data_request_fields() {
    let value = decode("DataRequest", DATA_REQUEST);
    assert_eq!(ident(&value, "seqID"), "dataReq");
    assert_eq!(int(&value, "serviceRegion/seCorner/lat"), 241_562_500);
    assert!(value.field("timeBound").is_none());
    assert_eq!(octets(&value, "distType"), "02");
}

#[test]
fn test_advisory_situation_data_fields() {
    let value = decode("AdvisorySituationData", ADVISORY_SITUATION_DATA);
    assert_eq!(ident(&value, "dialogID"), "advSitDataDep");
    assert_eq!(ident(&value, "seqID"), "data");
    assert_eq!(octets(&value, "requestID"), "6615ec7c");
    assert!(value.field("recordID").is_none());
    assert_eq!(ident(&value, "timeToLive"), "minute");
    assert_eq!(int(&value, "serviceRegion/nwCorner/lat"), 449_984_590);
    assert_eq!(int(&value, "serviceRegion/nwCorner/long"), -1_110_408_170);
    assert_eq!(int(&value, "serviceRegion/seCorner/lat"), 411_046_740);
    assert_eq!(int(&value, "serviceRegion/seCorner/long"), -1_041_113_120);
    assert_eq!(octets(&value, "asdmDetails/asdmID"), "6615ec7c");
    assert_eq!(ident(&value, "asdmDetails/asdmType"), "tim");
    assert_eq!(octets(&value, "asdmDetails/distType"), "10");
    assert_eq!(int(&value, "asdmDetails/startTime/year"), 2017);
    assert_eq!(int(&value, "asdmDetails/startTime/month"), 6);
    assert_eq!(int(&value, "asdmDetails/stopTime/year"), 2018);
    assert_eq!(int(&value, "asdmDetails/stopTime/minute"), 47);
    assert!(octets(&value, "asdmDetails/advisoryMessage").starts_with("03806d001f6a70"));
}

#[test]
fn test_advisory_situation_data_distribution_fields() {
    let value = decode("AdvisorySituationDataDistribution", ADVISORY_SITUATION_DATA_DISTRIBUTION);
    assert_eq!(ident(&value, "dialogID"), "advSitDatDist");
    assert_eq!(ident(&value, "seqID"), "data");
    assert_eq!(octets(&value, "requestID"), "e054e21b");
    assert_eq!(int(&value, "recordCount"), 14);
    assert_eq!(int(&value, "bundleCount"), 2);

    let bundles = match value.field("asdBundles") {
        Some(AbstractValue::SequenceOf(bundles)) => bundles,
        other => panic!("unexpected asdBundles {:?}", other),
    };
    let sizes: Vec<usize> = bundles
        .iter()
        .map(|bundle| match bundle.field("asdRecords") {
            Some(AbstractValue::SequenceOf(records)) => records.len(),
            other => panic!("unexpected asdRecords {:?}", other),
        })
        .collect();
    assert_eq!(sizes, [10, 4]);
    assert_eq!(int(&value, "asdBundles/1/bundleNumber"), 2);
    assert_eq!(octets(&value, "asdBundles/1/bundleId"), "5b99e92e");

    let first = "asdBundles/0/asdRecords/0";
    assert_eq!(octets(&value, &format!("{}/messagePsid", first)), "00008003");
    assert_eq!(ident(&value, &format!("{}/broadcastInst/biType", first)), "tim");
    assert_eq!(ident(&value, &format!("{}/broadcastInst/biTxChannel", first)), "ch180");
    assert_eq!(int(&value, &format!("{}/broadcastInst/biDeliveryStart/day", first)), 16);
    assert_eq!(int(&value, &format!("{}/broadcastInst/biDeliveryStop/day", first)), 23);
    assert_eq!(
        value.at_path(&format!("{}/broadcastInst/biSignature", first)),
        Some(&AbstractValue::Boolean(true))
    );
    assert!(octets(&value, &format!("{}/advisoryMessage", first)).starts_with("0380820120001f81"));

    // "This is an advisory message."
    let text = octets(&value, "asdBundles/0/asdRecords/7/advisoryMessage");
    assert_eq!(text, "5468697320697320616e2061647669736f7279206d6573736167652e");
}

#[test]
fn test_data_acceptance_xer() {
    let xml = per_to_xer(&model("DataAcceptance"), &bytes(DATA_ACCEPTANCE)).unwrap();
    assert_eq!(
        xml,
        "<DataAcceptance><dialogID><advSitDatDist/></dialogID><seqID><accept/></seqID>\
         <groupID>00000000</groupID><requestID>E054E21B</requestID></DataAcceptance>"
    );
    let root = XmlElement::parse(&xml, 64).unwrap();
    assert_eq!(
        element_names(&root),
        ["DataAcceptance", "dialogID", "advSitDatDist", "seqID", "accept", "groupID", "requestID"]
    );
}

#[test]
fn test_service_request_is_not_data_acceptance() {
    let err = per_to_xer(&model("DataAcceptance"), &bytes(SERVICE_REQUEST)).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::StructuralMismatch | ErrorKind::ConstraintViolation
    ));
}

#[test]
fn test_vectors_are_rejected_by_other_types() {
    init_logger();
    let twins = ["DataAcceptance", "DataReceipt"];
    for (name, hex) in vectors() {
        let per = bytes(hex);
        for ty in semi::all_types() {
            let other = ty.name();
            if other == name || (twins.contains(&name) && twins.contains(&other)) {
                continue;
            }
            assert!(
                per_to_xer(&ty, &per).is_err(),
                "{} vector decoded as {}",
                name,
                other
            );
        }
    }
}

#[test]
fn test_dropping_last_byte_truncates() {
    for (name, hex) in vectors() {
        let mut per = bytes(hex);
        per.pop();
        let err = per_to_xer(&model(name), &per).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput, "{}", name);
    }
}

#[test]
fn test_trailing_octets() {
    let mut per = bytes(DATA_ACCEPTANCE);
    per.push(0);
    let err = per_to_xer(&model("DataAcceptance"), &per).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralMismatch);

    let lenient = Transcoder::new(CodecSettings {
        allow_trailing_octets: true,
        ..CodecSettings::default()
    });
    assert!(lenient.per_to_xer(&model("DataAcceptance"), &per).is_ok());
}

#[test]
fn test_hex_forms_decode_identically() {
    for (name, hex) in vectors() {
        let contiguous: String = hex.split_whitespace().collect::<String>().to_uppercase();
        assert_eq!(decode(name, hex), decode(name, &contiguous), "{}", name);
    }
}

#[test]
fn test_cross_format_equivalence() {
    let transcoder = Transcoder::default();
    for (name, hex) in vectors() {
        let ty = model(name);
        let per = bytes(hex);
        let xml = transcoder.per_to_xer(&ty, &per).unwrap();
        assert_eq!(
            transcoder.decode_xer(&ty, &xml).unwrap(),
            transcoder.decode_per(&ty, &per).unwrap(),
            "{}",
            name
        );
    }
}

#[test]
fn test_guess_finds_each_type() {
    init_logger();
    let candidates = semi::all_types();
    for (name, hex) in vectors() {
        let result = guess_per_to_xer(&candidates, &bytes(hex));
        assert!(result.is_successful(), "{}", name);
        let expected = if name == "DataReceipt" { "DataAcceptance" } else { name };
        assert_eq!(result.matched_type().unwrap().name(), expected);
        assert!(result.data().is_some());
    }
}

#[test]
fn test_guess_prefers_earlier_candidate() {
    let candidates = vec![model("ServiceRequest"), model("DataReceipt"), model("DataAcceptance")];
    let result = guess_per_to_xer(&candidates, &bytes(DATA_ACCEPTANCE));
    assert_eq!(result.matched_type().unwrap().name(), "DataReceipt");
    assert!(result.data().unwrap().starts_with("<DataReceipt>"));
}

#[test]
fn test_guess_only_one_candidate_fits() {
    let candidates = vec![model("DataAcceptance"), model("DataRequest"), model("ServiceResponse")];
    let result = guess_per_to_xer(&candidates, &bytes(DATA_REQUEST));
    assert_eq!(result.matched_type().unwrap().name(), "DataRequest");
}

#[test]
fn test_guess_no_match() {
    init_logger();
    let candidates = vec![model("ServiceRequest"), model("DataRequest"), model("DataAcceptance")];
    let result = guess_per_to_xer(&candidates, &bytes(ADVISORY_SITUATION_DATA));
    assert!(!result.is_successful());
    assert!(result.matched_type().is_none());
    assert!(result.data().is_none());
    assert_eq!(result.failures().len(), 3);

    let result = guess_per_to_xer_with(
        &candidates,
        "8c 00 0",
        &HexPer,
        &RawXer,
        &CodecSettings::default(),
    );
    assert!(!result.is_successful());
    assert!(
        result
            .failures()
            .iter()
            .all(|f| f.error.kind() == ErrorKind::MalformedInput)
    );
}

#[test]
fn test_xer_guess_no_match() {
    init_logger();
    let candidates = semi::all_types();
    let xml = "<DataConfirmation><dialogID><advSitDatDist/></dialogID><seqID><dataConf/></seqID>\
               <groupID>00000000</groupID><requestID>00000000</requestID></DataConfirmation>";
    let result = guess_xer_to_per(&candidates, xml);
    assert!(!result.is_successful());
    assert!(result.matched_type().is_none());
    assert!(result.data().is_none());
    assert_eq!(result.failures().len(), candidates.len());
    assert!(
        result
            .failures()
            .iter()
            .all(|f| f.error.kind() == ErrorKind::StructuralMismatch)
    );

    let depth = 50_000;
    let deep = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
    let result = guess_xer_to_per(&candidates, &deep);
    assert!(!result.is_successful());
    assert!(
        result
            .failures()
            .iter()
            .all(|f| f.error.kind() == ErrorKind::UnsupportedType)
    );
}

/// Hand-written XER for every message type
fn xer_samples() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "AdvisorySituationData",
            "<AdvisorySituationData>\
               <dialogID><advSitDataDep/></dialogID>\
               <seqID><data/></seqID>\
               <groupID>00000000</groupID>\
               <requestID>00000000</requestID>\
               <serviceRegion>\
                 <nwCorner><lat>0</lat><long>0</long></nwCorner>\
                 <seCorner><lat>0</lat><long>0</long></seCorner>\
               </serviceRegion>\
               <asdmDetails>\
                 <asdmID>00000000</asdmID>\
                 <asdmType><tim/></asdmType>\
                 <distType>10</distType>\
                 <advisoryMessage>00</advisoryMessage>\
               </asdmDetails>\
             </AdvisorySituationData>",
        ),
        (
            "AdvisorySituationDataDistribution",
            "<AdvisorySituationDataDistribution>\
               <dialogID><advSitDatDist/></dialogID>\
               <seqID><data/></seqID>\
               <groupID>00000000</groupID>\
               <requestID>00000000</requestID>\
               <recordCount>1</recordCount>\
               <bundleCount>1</bundleCount>\
               <asdBundles>\
                 <AdvisorySituationBundle>\
                   <bundleNumber>1</bundleNumber>\
                   <bundleId>5B99E92E</bundleId>\
                   <asdRecords>\
                     <AdvisoryBroadcast>\
                       <messagePsid>00008003</messagePsid>\
                       <broadcastInst>\
                         <biType><tim/></biType>\
                         <biPriority>4</biPriority>\
                         <biTxMode><continuous/></biTxMode>\
                         <biTxChannel><ch180/></biTxChannel>\
                         <biTxInterval>3</biTxInterval>\
                         <biDeliveryStart><year>2017</year><month>10</month><day>29</day><hour>19</hour><minute>0</minute></biDeliveryStart>\
                         <biDeliveryStop><year>2017</year><month>11</month><day>6</day><hour>19</hour><minute>0</minute></biDeliveryStop>\
                         <biSignature><true/></biSignature>\
                         <biEncryption><false/></biEncryption>\
                         <biReserved>A820</biReserved>\
                       </broadcastInst>\
                       <advisoryMessage>5468697320697320616E2061647669736F7279206D6573736167652E</advisoryMessage>\
                     </AdvisoryBroadcast>\
                   </asdRecords>\
                 </AdvisorySituationBundle>\
               </asdBundles>\
             </AdvisorySituationDataDistribution>",
        ),
        (
            "ServiceRequest",
            "<ServiceRequest>\
               <dialogID><advSitDatDist/></dialogID>\
               <seqID><svcReq/></seqID>\
               <groupID>00000000</groupID>\
               <requestID>00000000</requestID>\
             </ServiceRequest>",
        ),
        (
            "ServiceResponse",
            "<ServiceResponse>\
               <dialogID><advSitDatDist/></dialogID>\
               <seqID><svcResp/></seqID>\
               <groupID>00000000</groupID>\
               <requestID>00000000</requestID>\
               <expiration></expiration>\
               <hash>0000000000000000000000000000000000000000000000000000000000000000</hash>\
             </ServiceResponse>",
        ),
        (
            "DataRequest",
            "<DataRequest>\
               <dialogID><advSitDatDist/></dialogID>\
               <seqID><dataReq/></seqID>\
               <groupID>00000000</groupID>\
               <requestID>00000000</requestID>\
               <serviceRegion>\
                 <nwCorner><lat>0</lat><long>0</long></nwCorner>\
                 <seCorner><lat>0</lat><long>0</long></seCorner>\
               </serviceRegion>\
               <distType>10</distType>\
             </DataRequest>",
        ),
        (
            "DataAcceptance",
            "<DataAcceptance>\
               <dialogID><advSitDatDist/></dialogID>\
               <seqID><accept/></seqID>\
               <groupID>00000000</groupID>\
               <requestID>00000000</requestID>\
             </DataAcceptance>",
        ),
        (
            "DataReceipt",
            "<DataReceipt>\
               <dialogID><advSitDatDist/></dialogID>\
               <seqID><receipt/></seqID>\
               <groupID>00000000</groupID>\
               <requestID>00000000</requestID>\
             </DataReceipt>",
        ),
    ]
}

#[test]
fn test_xer_samples_convert_to_per() {
    init_logger();
    let transcoder = Transcoder::default();
    for (name, xml) in xer_samples() {
        let ty = model(name);
        let per = transcoder
            .xer_to_per(&ty, xml)
            .unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert_eq!(
            transcoder.decode_per(&ty, &per).unwrap(),
            transcoder.decode_xer(&ty, xml).unwrap(),
            "{}",
            name
        );
    }
}

#[test]
fn test_xer_guess_matches_by_root() {
    let candidates = semi::all_types();
    for (name, xml) in xer_samples() {
        let result = guess_xer_to_per(&candidates, xml);
        assert_eq!(result.matched_type().unwrap().name(), name);
        assert!(result.data().is_some());
    }
}

#[test]
fn test_xer_leaf_errors() {
    let ty = model("DataAcceptance");
    let cases = [
        ("<DataAcceptance><dialogID><advSitDatDist/></dialogID><seqID><accept/></seqID>\
          <groupID>0000000G</groupID><requestID>00000000</requestID></DataAcceptance>",
         ErrorKind::MalformedInput),
        ("<DataAcceptance><dialogID><advSitDatDist/></dialogID><seqID><accept/></seqID>\
          <groupID>00000000</groupID></DataAcceptance>",
         ErrorKind::StructuralMismatch),
        ("<DataAcceptance><dialogID><advSitDatDist/></dialogID><seqID><accept/></seqID>\
          <groupID>0000</groupID><requestID>00000000</requestID></DataAcceptance>",
         ErrorKind::ConstraintViolation),
        ("<DataAcceptance><dialogID>", ErrorKind::MalformedInput),
    ];
    for (xml, kind) in cases {
        assert_eq!(xer_to_per(&ty, xml).unwrap_err().kind(), kind, "{}", xml);
    }
}
