use flux_derive::request;

#[request("notice/dismiss")]
pub struct DismissNoticeReq {
    pub id: u64,
}
