//! Endpoint paths and per-request construction
//!
//! Each method returns a brand new [`ApiRequest`] with its own header set
//! and, for forum endpoints, a freshly computed `DS` signature. Nothing is
//! shared or mutated between requests.

use serde_json::{json, Value};

use super::{ApiRequest, HttpMethod, RequestSigner};
use crate::account::Account;
use crate::config::MissionConfig;
use crate::game::Game;

pub const PATH_SIGN: &str = "/apihub/app/api/signIn";
pub const PATH_POST_LIST: &str = "/post/api/getForumPostList";
pub const PATH_POST_FULL: &str = "/post/api/getPostFull";
pub const PATH_UPVOTE: &str = "/apihub/sapi/upvotePost";
pub const PATH_SHARE: &str = "/apihub/api/getShareConf";
pub const PATH_MISSIONS: &str = "/apihub/wapi/getMissions";
pub const PATH_MISSIONS_STATE: &str = "/apihub/wapi/getUserMissionsState";

/// Builds signed requests for one account
pub struct RequestFactory<'a> {
    config: &'a MissionConfig,
    account: &'a Account,
    signer: &'a dyn RequestSigner,
}

impl<'a> RequestFactory<'a> {
    pub fn new(
        config: &'a MissionConfig,
        account: &'a Account,
        signer: &'a dyn RequestSigner,
    ) -> Self {
        Self {
            config,
            account,
            signer,
        }
    }

    pub fn sign_in(&self, game: Game) -> ApiRequest {
        let body = json!({ "gids": game.ids().gids });
        self.forum_request(HttpMethod::Post, PATH_SIGN.to_string(), Some(body))
    }

    pub fn post_list(&self, game: Game) -> ApiRequest {
        let path = format!(
            "{PATH_POST_LIST}?forum_id={}&is_good=false&is_hot=false&page_size=20&sort_type=1",
            game.ids().forum_id
        );
        self.forum_request(HttpMethod::Get, path, None)
    }

    pub fn post_full(&self, post_id: &str) -> ApiRequest {
        let path = format!("{PATH_POST_FULL}?post_id={post_id}");
        self.forum_request(HttpMethod::Get, path, None)
    }

    pub fn upvote(&self, post_id: &str) -> ApiRequest {
        let body = json!({ "is_cancel": false, "post_id": post_id });
        self.forum_request(HttpMethod::Post, PATH_UPVOTE.to_string(), Some(body))
    }

    pub fn share_conf(&self, post_id: &str) -> ApiRequest {
        let path = format!("{PATH_SHARE}?entity_id={post_id}&entity_type=1");
        self.forum_request(HttpMethod::Get, path, None)
    }

    pub fn missions(&self) -> ApiRequest {
        self.web_request(format!("{PATH_MISSIONS}?point_sn=myb"))
    }

    pub fn missions_state(&self) -> ApiRequest {
        self.web_request(format!("{PATH_MISSIONS_STATE}?point_sn=myb"))
    }

    fn forum_request(&self, method: HttpMethod, path: String, body: Option<Value>) -> ApiRequest {
        let device = &self.config.device;
        let ds = self.signer.sign(body.as_ref(), device.platform);
        let headers = vec![
            header("Referer", "https://app.mihoyo.com"),
            header("User-Agent", &device.user_agent),
            header("x-rpc-app_version", &device.app_version),
            header("x-rpc-channel", &device.channel),
            header("x-rpc-client_type", device.platform.client_type()),
            header("x-rpc-device_id", &self.account.device_id),
            header("x-rpc-device_model", &device.device_model),
            header("x-rpc-device_name", &device.device_name),
            header("x-rpc-sys_version", &device.sys_version),
            header("DS", &ds),
            header("Cookie", &self.account.cookie_header()),
        ];
        ApiRequest {
            method,
            url: format!("{}{}", self.config.endpoints.bbs_base, path),
            headers,
            body,
        }
    }

    fn web_request(&self, path: String) -> ApiRequest {
        let headers = vec![
            header("Origin", "https://webstatic.mihoyo.com"),
            header("Referer", "https://webstatic.mihoyo.com/"),
            header("User-Agent", &self.config.device.web_user_agent),
            header("Accept", "application/json, text/plain, */*"),
            header("Accept-Language", "zh-CN,zh-Hans;q=0.9"),
            header("Cookie", &self.account.cookie_header()),
        ];
        ApiRequest {
            method: HttpMethod::Get,
            url: format!("{}{}", self.config.endpoints.takumi_base, path),
            headers,
            body: None,
        }
    }
}

fn header(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}
