use crate::storage::{NewScrollEvent, ScrollEvent, Tracker};
use migration::entities::{scroll_event, tracker};

pub fn model_to_tracker(model: tracker::Model) -> Tracker {
    Tracker {
        id: model.id,
        owner: model.owner,
        created_at: model.created_at,
    }
}

pub fn tracker_to_active_model(tracker: &Tracker) -> tracker::ActiveModel {
    use sea_orm::ActiveValue::Set;

    tracker::ActiveModel {
        id: Set(tracker.id.clone()),
        owner: Set(tracker.owner.clone()),
        created_at: Set(tracker.created_at),
    }
}

/// 将 Sea-ORM Model 转换为 ScrollEvent
///
/// engagement 以 JSON 文本存储，无法解析时视为缺失
pub fn model_to_scroll_event(model: scroll_event::Model) -> ScrollEvent {
    let engagement = model
        .engagement_data
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());

    ScrollEvent {
        id: model.id,
        tracker_id: model.tracker_id,
        scroll_depth: model.scroll_depth,
        page_url: model.page_url,
        occurred_at: model.occurred_at,
        time_on_page: model.time_on_page,
        total_time_on_page: model.total_time_on_page,
        max_scroll_depth: model.max_scroll_depth,
        scroll_events: model.scroll_events_count,
        engagement,
        ua: model.ua,
        viewport_w: model.viewport_w,
        viewport_h: model.viewport_h,
        ip_address: model.ip_address,
    }
}

/// 将待插入事件转换为 ActiveModel（id 由数据库生成）
pub fn new_event_to_active_model(event: &NewScrollEvent) -> scroll_event::ActiveModel {
    use sea_orm::ActiveValue::{NotSet, Set};

    scroll_event::ActiveModel {
        id: NotSet,
        tracker_id: Set(event.tracker_id.clone()),
        scroll_depth: Set(event.scroll_depth),
        page_url: Set(event.page_url.clone()),
        occurred_at: Set(event.occurred_at),
        time_on_page: Set(event.time_on_page),
        total_time_on_page: Set(event.total_time_on_page),
        max_scroll_depth: Set(event.max_scroll_depth),
        scroll_events_count: Set(event.scroll_events),
        engagement_data: Set(event.engagement.as_ref().map(|v| v.to_string())),
        ua: Set(event.ua.clone()),
        viewport_w: Set(event.viewport_w),
        viewport_h: Set(event.viewport_h),
        ip_address: Set(event.ip_address.clone()),
    }
}
