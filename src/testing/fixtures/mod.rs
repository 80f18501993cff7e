//! Canned server payloads

use serde_json::json;

use crate::mission::actions::POST_NOT_FOUND;

/// Forum post list; each entry is `(post_id, attitude)`
pub fn post_list(posts: &[(&str, i64)]) -> String {
    let list: Vec<_> = posts
        .iter()
        .map(|(post_id, attitude)| {
            json!({
                "post": { "post_id": post_id, "subject": format!("post {post_id}") },
                "self_operation": { "attitude": attitude, "is_collected": false },
            })
        })
        .collect();
    json!({ "retcode": 0, "message": "OK", "data": { "list": list, "is_last": false } }).to_string()
}

/// Full post; without `self_operation` when `with_self_operation` is false
pub fn post_full(with_self_operation: bool) -> String {
    let mut post = json!({ "post": { "post_id": "1", "subject": "post" } });
    if with_self_operation {
        post["self_operation"] = json!({ "attitude": 0, "is_collected": false });
    }
    json!({ "retcode": 0, "message": "OK", "data": { "post": post } }).to_string()
}

/// Reply carrying only a `message`
pub fn message(message: &str) -> String {
    let retcode = if message == POST_NOT_FOUND { 1102 } else { 0 };
    json!({ "retcode": retcode, "message": message, "data": null }).to_string()
}

pub fn sign_points(points: i64) -> String {
    json!({ "retcode": 0, "message": "OK", "data": { "points": points } }).to_string()
}

pub fn auth_expired() -> String {
    json!({ "retcode": -100, "message": "登录失效，请重新登录", "data": null }).to_string()
}

/// Mission catalog; each entry is `(mission_key, threshold)`
pub fn missions(missions: &[(&str, u32)]) -> String {
    let list: Vec<_> = missions
        .iter()
        .map(|(key, threshold)| {
            json!({
                "id": 1,
                "points": 20,
                "name": key,
                "mission_key": key,
                "threshold": threshold,
            })
        })
        .collect();
    json!({ "retcode": 0, "message": "OK", "data": { "missions": list } }).to_string()
}

/// Mission states; each entry is `(mission_key, happened_times)`
pub fn mission_states(total_points: i64, states: &[(&str, u32)]) -> String {
    let list: Vec<_> = states
        .iter()
        .map(|(key, times)| json!({ "mission_key": key, "happened_times": times, "process": 0 }))
        .collect();
    json!({
        "retcode": 0,
        "message": "OK",
        "data": { "total_points": total_points, "states": list, "can_get_points": 0 },
    })
    .to_string()
}
