use super::test_helpers::*;
use super::*;

// --- price_value ---

#[test]
fn price_value_parses_string_decimal() {
    let v = vehicle("a", "Honda", "Civic", 2020, Some(" 18500.50 "));
    assert_eq!(v.price_value(), Some(18_500.5));
}

#[test]
fn price_value_none_for_missing_or_garbage() {
    assert_eq!(vehicle("a", "Honda", "Civic", 2020, None).price_value(), None);
    assert_eq!(vehicle("b", "Honda", "Civic", 2020, Some("")).price_value(), None);
    assert_eq!(vehicle("c", "Honda", "Civic", 2020, Some("call us")).price_value(), None);
    assert_eq!(vehicle("d", "Honda", "Civic", 2020, Some("NaN")).price_value(), None);
    assert_eq!(vehicle("e", "Honda", "Civic", 2020, Some("inf")).price_value(), None);
}

// --- serde ---

#[test]
fn deserializes_mongo_style_record() {
    let json = r#"{
        "_id": "65f1c0",
        "brand": "BMW",
        "model": "M3",
        "year": "2019",
        "price": 64000,
        "images": [{"url": "/uploads/m3.jpg"}]
    }"#;
    let v: Vehicle = serde_json::from_str(json).unwrap();
    assert_eq!(v.id, "65f1c0");
    assert_eq!(v.year, Some(2019));
    assert_eq!(v.price.as_deref(), Some("64000"));
    assert!(v.available, "availability defaults to true");
    assert!(v.description.is_empty());
    assert!(v.has_images());
}

#[test]
fn deserializes_missing_and_null_price() {
    let v: Vehicle =
        serde_json::from_str(r#"{"id":"x","brand":"Kia","model":"Rio","year":2015,"price":null}"#).unwrap();
    assert_eq!(v.price, None);
    let v: Vehicle = serde_json::from_str(r#"{"id":"x","brand":"Kia","model":"Rio","year":2015}"#).unwrap();
    assert_eq!(v.price, None);
    assert!(!v.has_images());
}

#[test]
fn unreadable_year_decodes_as_none() {
    for raw in [r#""soon""#, "null", "2019.5", "[2019]", "99999999999"] {
        let json = format!(r#"{{"id":"x","brand":"Kia","model":"Rio","year":{raw}}}"#);
        let v: Vehicle = serde_json::from_str(&json).unwrap();
        assert_eq!(v.year, None, "year {raw}");
    }
    let v: Vehicle = serde_json::from_str(r#"{"id":"x","brand":"Kia","model":"Rio"}"#).unwrap();
    assert_eq!(v.year, None);
    let v: Vehicle = serde_json::from_str(r#"{"id":"x","brand":"Kia","model":"Rio","year":2018.0}"#).unwrap();
    assert_eq!(v.year, Some(2018));
}

#[test]
fn unreadable_price_decodes_as_none() {
    let v: Vehicle = serde_json::from_str(r#"{"id":"x","brand":"Kia","model":"Rio","price":{"amount":1}}"#).unwrap();
    assert_eq!(v.price, None);
}

// --- NewVehicle::validate ---

#[test]
fn new_vehicle_valid() {
    assert_eq!(new_vehicle().validate(), Ok(()));
}

#[test]
fn new_vehicle_requires_brand_and_model() {
    let mut form = new_vehicle();
    form.brand = "  ".into();
    assert_eq!(form.validate(), Err(InventoryError::MissingField("brand")));

    let mut form = new_vehicle();
    form.model = String::new();
    assert_eq!(form.validate(), Err(InventoryError::MissingField("model")));
}

#[test]
fn new_vehicle_requires_numeric_price() {
    let mut form = new_vehicle();
    form.price = "fifty".into();
    assert_eq!(form.validate(), Err(InventoryError::InvalidPrice("fifty".into())));
}

#[test]
fn new_vehicle_requires_an_image() {
    let mut form = new_vehicle();
    form.images.clear();
    assert_eq!(form.validate(), Err(InventoryError::NoImages));
}

#[test]
fn image_upload_guesses_content_type() {
    assert_eq!(ImageUpload::new("a.JPG", vec![]).content_type, "image/jpeg");
    assert_eq!(ImageUpload::new("a.png", vec![]).content_type, "image/png");
    assert_eq!(ImageUpload::new("a.webp", vec![]).content_type, "image/webp");
    assert_eq!(ImageUpload::new("noext", vec![]).content_type, "application/octet-stream");
}

// --- VehicleUpdate ---

#[test]
fn update_applies_only_present_fields() {
    let mut v = vehicle("a", "Honda", "Civic", 2020, Some("18000"));
    let update = VehicleUpdate { price: Some("17500".into()), available: Some(false), ..VehicleUpdate::default() };
    update.apply(&mut v).unwrap();
    assert_eq!(v.price.as_deref(), Some("17500"));
    assert!(!v.available);
    assert_eq!(v.brand, "Honda");
    assert_eq!(v.year, Some(2020));
}

#[test]
fn update_rejects_bad_price_without_mutating() {
    let mut v = vehicle("a", "Honda", "Civic", 2020, Some("18000"));
    let update = VehicleUpdate { brand: Some("Acura".into()), price: Some("n/a".into()), ..VehicleUpdate::default() };
    assert_eq!(update.apply(&mut v), Err(InventoryError::InvalidPrice("n/a".into())));
    assert_eq!(v.brand, "Honda");
}

#[test]
fn update_serializes_only_present_fields() {
    let update = VehicleUpdate { year: Some(2021), ..VehicleUpdate::default() };
    assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"year": 2021}));
    assert!(VehicleUpdate::default().is_empty());
    assert!(!update.is_empty());
}
