//! Single-listing enrichment through the detail API.

use std::time::Duration;

use serde::Serialize;

use crate::client::MtopClient;
use crate::error::MtopError;
use crate::item::{CpvLabel, ItemDetail, ItemImage, ListingTime, SellerProfile, Sku, SkuProperty};
use crate::retry::retry_rate_limited;
use crate::tags::FREE_SHIPPING_TAG;
use crate::types::{MtopResponse, RawDetailData};

pub const DETAIL_API: &str = "mtop.taobao.idle.pc.detail";

/// Base unit of the linear detail backoff.
pub const DETAIL_BACKOFF_BASE: Duration = Duration::from_secs(1);

const CONDITION_PROPERTY: &str = "成色";
const BRAND_NEW: &str = "全新";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailRequest<'a> {
    item_id: &'a str,
}

impl MtopClient {
    /// Fetches the full record for one listing.
    ///
    /// # Errors
    ///
    /// - [`MtopError::EmptyItemId`] before any network call if `item_id` is blank.
    /// - Any error from [`MtopClient::call`].
    /// - [`MtopError::Deserialize`] if the detail payload does not decode.
    pub async fn fetch_detail(&self, item_id: &str) -> Result<ItemDetail, MtopError> {
        let item_id = item_id.trim();
        if item_id.is_empty() {
            return Err(MtopError::EmptyItemId);
        }
        let response = self.call(DETAIL_API, &DetailRequest { item_id }).await?;
        parse_detail(&response)
    }

    /// [`MtopClient::fetch_detail`] with up to `max_attempts` tries on
    /// rate-limit rejections, waiting `attempt × 1s` between them.
    ///
    /// # Errors
    ///
    /// Non-throttling errors are returned on first occurrence; exhausting the
    /// attempts yields [`MtopError::RetriesExhausted`].
    pub async fn fetch_detail_with_retry(
        &self,
        item_id: &str,
        max_attempts: u32,
    ) -> Result<ItemDetail, MtopError> {
        self.fetch_detail_with_backoff(item_id, max_attempts, DETAIL_BACKOFF_BASE)
            .await
    }

    /// Like [`MtopClient::fetch_detail_with_retry`] with a custom backoff unit.
    ///
    /// # Errors
    ///
    /// See [`MtopClient::fetch_detail_with_retry`].
    pub async fn fetch_detail_with_backoff(
        &self,
        item_id: &str,
        max_attempts: u32,
        backoff_base: Duration,
    ) -> Result<ItemDetail, MtopError> {
        retry_rate_limited(max_attempts, backoff_base, || self.fetch_detail(item_id)).await
    }
}

/// Decodes a detail envelope into an [`ItemDetail`].
///
/// # Errors
///
/// Returns [`MtopError::Deserialize`] if the payload shape is unusable.
pub fn parse_detail(response: &MtopResponse) -> Result<ItemDetail, MtopError> {
    let raw: RawDetailData =
        serde_json::from_value(response.data.clone()).map_err(|e| MtopError::Deserialize {
            context: "item detail data".to_string(),
            body: response.data.to_string(),
            source: e,
        })?;
    let item = raw.item_do;
    let seller = raw.seller_do;

    let image_url = item
        .image_infos
        .iter()
        .find(|img| img.major)
        .or_else(|| item.image_infos.first())
        .map(|img| img.url.clone())
        .unwrap_or_default();
    let images = item
        .image_infos
        .into_iter()
        .map(|img| ItemImage {
            url: img.url,
            major: img.major,
            width: img.width_size,
            height: img.height_size,
        })
        .collect();

    let skus: Vec<Sku> = item
        .sku_list
        .into_iter()
        .map(|sku| Sku {
            sku_id: sku.sku_id,
            inventory_id: sku.inventory_id,
            price_in_cent: sku.price_in_cent,
            quantity: sku.quantity,
            properties: sku
                .property_list
                .into_iter()
                .map(|p| SkuProperty {
                    property_id: p.property_id,
                    property_text: p.property_text,
                    value_id: p.value_id,
                    value_text: p.value_text,
                    actual_value_text: p.actual_value_text,
                })
                .collect(),
        })
        .collect();
    let price_in_cent = skus
        .iter()
        .map(|s| s.price_in_cent)
        .find(|p| *p > 0)
        .unwrap_or(0);

    let cpv_labels: Vec<CpvLabel> = item
        .cpv_labels
        .into_iter()
        .map(|l| CpvLabel {
            property_id: l.property_id,
            property_name: l.property_name,
            value_id: l.value_id,
            value_name: l.value_name,
        })
        .collect();
    let condition = cpv_labels
        .iter()
        .find(|l| l.property_name == CONDITION_PROPERTY)
        .map(|l| l.value_name.clone())
        .unwrap_or_default();

    let mut tags: Vec<String> = Vec::new();
    for text in item
        .common_tags
        .into_iter()
        .chain(item.item_label_ext_list)
        .map(|t| t.text)
        .filter(|t| !t.is_empty())
    {
        if !tags.contains(&text) {
            tags.push(text);
        }
    }
    let free_shipping = tags.iter().any(|t| t == FREE_SHIPPING_TAG);

    Ok(ItemDetail {
        item_id: item.item_id,
        title: item.title,
        description: item.desc,
        category_id: item.category_id,
        price: item.sold_price,
        original_price: item.original_price,
        price_in_cent,
        item_status: item.item_status,
        item_status_str: item.item_status_str,
        want_count: u32::try_from(item.want_cnt).unwrap_or(u32::MAX),
        view_count: item.browse_cnt,
        collect_count: item.collect_cnt,
        quantity: item.quantity,
        publish_time: ListingTime::from_millis(item.gmt_create),
        image_url,
        images,
        video_url: item.video_url,
        skus,
        is_new: condition == BRAND_NEW,
        condition,
        cpv_labels,
        free_shipping,
        transport_fee: item.transport_fee,
        tags,
        seller: SellerProfile {
            seller_id: seller.seller_id,
            nick: seller.nick,
            city: seller.city,
            avatar_url: seller.portrait_url,
            signature: seller.signature,
            item_count: seller.item_count,
            sold_count: seller.has_sold_num_integer,
            registration_days: seller.user_reg_day,
            credit: seller.zhima_level_info.level_name,
            shop_level: seller.idle_fish_credit_tag.track_params.seller_level,
        },
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn envelope(data: serde_json::Value) -> MtopResponse {
        MtopResponse {
            ret: vec!["SUCCESS::调用成功".to_string()],
            v: "1.0".to_string(),
            data,
        }
    }

    #[test]
    fn parses_detail_payload() {
        let data = json!({
            "itemDO": {
                "itemId": 987_654_321_i64,
                "title": "相机",
                "desc": "九成新，无划痕",
                "categoryId": 50_025,
                "soldPrice": "1200",
                "itemStatus": 0,
                "itemStatusStr": "在售",
                "wantCnt": 31,
                "browseCnt": 900,
                "collectCnt": 12,
                "gmtCreate": 1_700_000_000_000_i64,
                "quantity": 1,
                "imageInfos": [
                    { "url": "https://img/1.jpg", "major": false, "widthSize": 800, "heightSize": 600 },
                    { "url": "https://img/2.jpg", "major": true, "widthSize": 1024, "heightSize": 768 }
                ],
                "skuList": [
                    { "skuId": 1, "inventoryId": 2, "priceInCent": 0, "quantity": 1, "propertyList": [] },
                    { "skuId": 3, "inventoryId": 4, "priceInCent": 120_000, "quantity": 1,
                      "propertyList": [ { "propertyId": 10, "propertyText": "颜色", "valueId": 11, "valueText": "黑" } ] }
                ],
                "cpvLabels": [ { "propertyId": 5, "propertyName": "成色", "valueId": 6, "valueName": "全新" } ],
                "commonTags": [ { "text": "包邮" }, { "text": "" } ],
                "itemLabelExtList": [ { "text": "验货宝" }, { "text": "包邮" } ],
                "transportFee": "0.00"
            },
            "sellerDO": {
                "sellerId": 42,
                "nick": "bob",
                "city": "上海",
                "portraitUrl": "https://img/avatar.jpg",
                "signature": "hi",
                "itemCount": 7,
                "hasSoldNumInteger": 88,
                "userRegDay": 1500,
                "zhimaLevelInfo": { "levelName": "信用极好" },
                "idleFishCreditTag": { "trackParams": { "sellerLevel": "4" } }
            }
        });

        let detail = parse_detail(&envelope(data)).unwrap();
        assert_eq!(detail.item_id, "987654321");
        assert_eq!(detail.description, "九成新，无划痕");
        assert_eq!(detail.price, "1200");
        assert_eq!(detail.want_count, 31);
        assert_eq!(detail.view_count, 900);
        assert_eq!(detail.collect_count, 12);
        assert_eq!(detail.image_url, "https://img/2.jpg");
        assert_eq!(detail.images.len(), 2);
        assert_eq!(detail.price_in_cent, 120_000);
        assert_eq!(detail.skus[1].properties[0].value_text, "黑");
        assert_eq!(detail.condition, "全新");
        assert!(detail.is_new);
        assert!(detail.free_shipping);
        assert_eq!(detail.tags, vec!["包邮", "验货宝"]);
        assert_eq!(
            detail.publish_time.as_ref().map(|t| t.epoch_ms),
            Some(1_700_000_000_000)
        );
        assert_eq!(detail.seller.seller_id, "42");
        assert_eq!(detail.seller.credit, "信用极好");
        assert_eq!(detail.seller.shop_level, "4");
        assert_eq!(detail.seller.registration_days, 1500);
    }

    #[test]
    fn empty_payload_yields_defaults() {
        let detail = parse_detail(&envelope(json!({}))).unwrap();
        assert_eq!(detail, ItemDetail::default());
    }

    #[test]
    fn null_nested_objects_keep_the_detail() {
        let data = json!({
            "itemDO": {
                "itemId": "5",
                "title": "耳机",
                "imageInfos": null,
                "skuList": [ { "skuId": 1, "propertyList": null } ],
                "cpvLabels": null,
                "commonTags": null,
                "itemLabelExtList": null
            },
            "sellerDO": { "nick": "carol", "zhimaLevelInfo": null, "idleFishCreditTag": null }
        });
        let detail = parse_detail(&envelope(data)).unwrap();
        assert_eq!(detail.item_id, "5");
        assert_eq!(detail.title, "耳机");
        assert!(detail.images.is_empty());
        assert_eq!(detail.seller.nick, "carol");

        let detail = parse_detail(&envelope(json!({ "itemDO": null, "sellerDO": null }))).unwrap();
        assert_eq!(detail, ItemDetail::default());
    }

    #[test]
    fn image_url_falls_back_to_first_image() {
        let data = json!({ "itemDO": { "imageInfos": [ { "url": "https://img/only.jpg" } ] } });
        assert_eq!(parse_detail(&envelope(data)).unwrap().image_url, "https://img/only.jpg");
    }

    #[test]
    fn non_object_payload_is_decode_error() {
        let err = parse_detail(&envelope(json!([1, 2]))).unwrap_err();
        assert!(matches!(err, MtopError::Deserialize { .. }));
    }
}
