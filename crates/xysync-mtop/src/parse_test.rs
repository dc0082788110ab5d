use serde_json::json;

use super::*;

fn envelope(data: Value) -> MtopResponse {
    MtopResponse {
        ret: vec!["SUCCESS::调用成功".to_string()],
        v: "1.0".to_string(),
        data,
    }
}

fn card(item_id: &str, want_tag: &str) -> Value {
    json!({
        "cardData": {
            "detailParams": { "itemId": item_id, "title": format!("item {item_id}") },
            "priceInfo": { "price": "10" },
            "fishTags": {
                "r1": { "tagList": [ { "data": { "content": want_tag } } ] }
            }
        }
    })
}

#[test]
fn parses_full_card() {
    let card = json!({
        "cardData": {
            "categoryId": 50_025_450,
            "status": "0",
            "viewCount": 321,
            "detailParams": {
                "itemId": "123",
                "picUrl": "https://img.example.com/a.jpg",
                "title": "九成新 相机",
                "userNick": "fallback-nick",
                "isVideo": "1"
            },
            "user": { "userNick": "alice" },
            "priceInfo": { "price": "199", "oriPrice": "299" },
            "hotPoint": { "text": "" },
            "images": [ { "url": "https://img.example.com/a.jpg" }, { "url": "" } ],
            "redirectUrl": "fleamarket://item?id=123",
            "city": "杭州",
            "attributeMap": {
                "gmtShelf": "1700000000000",
                "gmtModified": 1_700_000_100_000_i64,
                "proPolishTime": "0",
                "freeShipping": "1"
            },
            "fishTags": {
                "r1": { "tagList": [
                    { "data": { "content": "12人想要" } },
                    { "data": { "content": "信用极好" } }
                ] },
                "r2": { "tagList": [
                    { "data": { "content": "卖家" }, "utParams": { "args": { "content": "seller_level_3" } } },
                    { "data": { "content": "可小刀" } }
                ] }
            }
        }
    });

    let item = parse_card(card).unwrap().expect("card has an item id");
    assert_eq!(item.item_id, "123");
    assert_eq!(item.title, "九成新 相机");
    assert_eq!(item.price, "199");
    assert_eq!(item.original_price, "299");
    assert_eq!(item.seller_nick, "alice");
    assert_eq!(item.city, "杭州");
    assert_eq!(item.want_count, 12);
    assert_eq!(item.view_count, 321);
    assert_eq!(item.category_id, 50_025_450);
    assert_eq!(item.seller_credit, "信用极好");
    assert_eq!(item.shop_level, "seller_level_3");
    assert!(item.free_shipping);
    assert!(item.is_video);
    assert_eq!(item.images, vec!["https://img.example.com/a.jpg"]);
    assert_eq!(item.publish_time_ms(), 1_700_000_000_000);
    assert_eq!(
        item.modified_time.as_ref().map(|t| t.epoch_ms),
        Some(1_700_000_100_000)
    );
    assert!(item.polish_time.is_none());
    assert_eq!(item.tags, vec!["信用极好", "seller_level_3", "可小刀"]);
}

#[test]
fn want_count_falls_back_to_hot_point() {
    let card = json!({
        "cardData": {
            "detailParams": { "itemId": "9" },
            "hotPoint": { "text": "8人想要" }
        }
    });
    let item = parse_card(card).unwrap().unwrap();
    assert_eq!(item.want_count, 8);
}

#[test]
fn tag_want_count_beats_hot_point() {
    let mut card = card("9", "3人想要");
    card["cardData"]["hotPoint"] = json!({ "text": "8人想要" });
    let item = parse_card(card).unwrap().unwrap();
    assert_eq!(item.want_count, 3);
}

#[test]
fn price_falls_back_to_sold_price() {
    let card = json!({
        "cardData": { "detailParams": { "itemId": "9", "soldPrice": "55" } }
    });
    assert_eq!(parse_card(card).unwrap().unwrap().price, "55");
}

#[test]
fn card_without_item_id_yields_none() {
    let card = json!({ "cardData": { "detailParams": { "title": "no id" } } });
    assert!(parse_card(card).unwrap().is_none());
}

#[test]
fn page_skips_bad_cards_and_keeps_the_rest() {
    let data = json!({
        "cardList": [
            card("123", "25人想要"),
            { "cardData": { "detailParams": { "title": "missing id" } } },
            { "cardData": "not an object" },
            card("456", "5人想要")
        ],
        "nextPage": true
    });
    let page = parse_page(&envelope(data)).unwrap();
    assert!(page.has_next_page);
    assert_eq!(page.skipped_cards, 2);
    let ids: Vec<_> = page.items.iter().map(|i| i.item_id.as_str()).collect();
    assert_eq!(ids, vec!["123", "456"]);
}

#[test]
fn page_keeps_duplicate_item_ids() {
    let data = json!({
        "cardList": [card("1", "2人想要"), card("1", "2人想要")],
        "nextPage": false
    });
    let page = parse_page(&envelope(data)).unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(!page.has_next_page);
}

#[test]
fn missing_card_list_is_an_empty_page() {
    let page = parse_page(&envelope(json!({}))).unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_next_page);
}

#[test]
fn non_object_page_is_a_decode_error() {
    let err = parse_page(&envelope(json!("oops"))).unwrap_err();
    assert!(matches!(err, MtopError::Deserialize { .. }));
}

#[test]
fn null_sub_objects_keep_the_card() {
    for field in [
        "hotPoint",
        "user",
        "priceInfo",
        "images",
        "attributeMap",
        "fishTags",
    ] {
        let mut card = card("123", "25人想要");
        card["cardData"][field] = Value::Null;
        let item = parse_card(card)
            .unwrap_or_else(|e| panic!("{field}=null should decode: {e}"))
            .unwrap_or_else(|| panic!("{field}=null dropped the item"));
        assert_eq!(item.item_id, "123", "{field}=null");
    }
}

#[test]
fn null_tag_data_and_tag_list_are_ignored() {
    let card = json!({
        "cardData": {
            "detailParams": { "itemId": "7" },
            "fishTags": {
                "r1": { "tagList": null },
                "r2": { "tagList": [ { "data": null }, { "data": { "content": "4人想要" } } ] }
            }
        }
    });
    let item = parse_card(card).unwrap().unwrap();
    assert_eq!(item.want_count, 4);
}

#[test]
fn null_detail_params_is_a_card_without_id() {
    let card = json!({ "cardData": { "detailParams": null } });
    assert!(parse_card(card).unwrap().is_none());
}

#[test]
fn null_card_data_and_card_list_decode_as_empty() {
    assert!(parse_card(json!({ "cardData": null })).unwrap().is_none());
    let page = parse_page(&envelope(json!({ "cardList": null, "nextPage": false }))).unwrap();
    assert!(page.items.is_empty());
}
