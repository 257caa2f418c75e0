//! UI string catalog.

use serde::Deserialize;
use strum::{Display, EnumString};

/// Display language for notices and rendered views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

/// Catalog keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    PanelTitle,
    TabRoutes,
    TabCreate,
    TabHealth,
    ApiKey,
    SaveApiKey,
    ApiKeySaved,
    RequestFailed,
    Loading,
    NoRoutes,
    LoadFailed,
    StatusActive,
    StatusInactive,
    Edit,
    Activate,
    Deactivate,
    Delete,
    Cancel,
    Confirm,
    ConfirmDelete,
    InvalidForm,
    RouteCreated,
    CreateFailed,
    FetchRouteFailed,
    RouteUpdated,
    UpdateFailed,
    RouteActivated,
    RouteDeactivated,
    OperationFailed,
    RouteDeleted,
    DeleteFailed,
    BatchCompleted,
    BatchFailed,
    HealthFailed,
    Status,
    Database,
    TotalRoutes,
    ActiveRoutes,
    InactiveRoutes,
    LastChecked,
    Path,
    Methods,
    StatusCode,
    Delay,
    Description,
    Headers,
    ResponseBody,
    IsActive,
    CreateRoute,
    UpdateRoute,
    ActiveOnly,
    Search,
    PerPage,
    Previous,
    Next,
    Page,
    Total,
    Apply,
}

impl Locale {
    /// Look up a catalog entry.
    pub fn text(self, msg: Msg) -> &'static str {
        match self {
            Locale::En => english(msg),
            Locale::Zh => chinese(msg),
        }
    }
}

fn english(msg: Msg) -> &'static str {
    match msg {
        Msg::PanelTitle => "Mock Server Admin",
        Msg::TabRoutes => "Routes",
        Msg::TabCreate => "Create Route",
        Msg::TabHealth => "Health",
        Msg::ApiKey => "API key",
        Msg::SaveApiKey => "Save",
        Msg::ApiKeySaved => "API key saved",
        Msg::RequestFailed => "Request failed",
        Msg::Loading => "Loading...",
        Msg::NoRoutes => "No routes",
        Msg::LoadFailed => "Failed to load",
        Msg::StatusActive => "✅ Active",
        Msg::StatusInactive => "❌ Inactive",
        Msg::Edit => "Edit",
        Msg::Activate => "Activate",
        Msg::Deactivate => "Deactivate",
        Msg::Delete => "Delete",
        Msg::Cancel => "Cancel",
        Msg::Confirm => "Confirm",
        Msg::ConfirmDelete => "Are you sure you want to delete this route?",
        Msg::InvalidForm => "Invalid form",
        Msg::RouteCreated => "Route created",
        Msg::CreateFailed => "Failed to create route",
        Msg::FetchRouteFailed => "Failed to fetch route details",
        Msg::RouteUpdated => "Route updated",
        Msg::UpdateFailed => "Failed to update route",
        Msg::RouteActivated => "Route activated",
        Msg::RouteDeactivated => "Route deactivated",
        Msg::OperationFailed => "Operation failed",
        Msg::RouteDeleted => "Route deleted",
        Msg::DeleteFailed => "Failed to delete route",
        Msg::BatchCompleted => "Batch operation completed",
        Msg::BatchFailed => "Batch operation failed",
        Msg::HealthFailed => "Failed to load health status",
        Msg::Status => "Status",
        Msg::Database => "Database",
        Msg::TotalRoutes => "Total routes",
        Msg::ActiveRoutes => "Active routes",
        Msg::InactiveRoutes => "Inactive routes",
        Msg::LastChecked => "Last checked",
        Msg::Path => "Path",
        Msg::Methods => "HTTP methods",
        Msg::StatusCode => "Status code",
        Msg::Delay => "Response delay (s)",
        Msg::Description => "Description",
        Msg::Headers => "Response headers (JSON)",
        Msg::ResponseBody => "Response body (JSON)",
        Msg::IsActive => "Active",
        Msg::CreateRoute => "Create route",
        Msg::UpdateRoute => "Update route",
        Msg::ActiveOnly => "Active only",
        Msg::Search => "Search",
        Msg::PerPage => "Per page",
        Msg::Previous => "Previous",
        Msg::Next => "Next",
        Msg::Page => "Page",
        Msg::Total => "Total",
        Msg::Apply => "Apply",
    }
}

fn chinese(msg: Msg) -> &'static str {
    match msg {
        Msg::PanelTitle => "Mock Server 管理",
        Msg::TabRoutes => "路由列表",
        Msg::TabCreate => "创建路由",
        Msg::TabHealth => "健康状态",
        Msg::ApiKey => "API密钥",
        Msg::SaveApiKey => "保存",
        Msg::ApiKeySaved => "API密钥已保存",
        Msg::RequestFailed => "请求失败",
        Msg::Loading => "加载中...",
        Msg::NoRoutes => "暂无路由",
        Msg::LoadFailed => "加载失败",
        Msg::StatusActive => "✅ 激活",
        Msg::StatusInactive => "❌ 停用",
        Msg::Edit => "编辑",
        Msg::Activate => "激活",
        Msg::Deactivate => "停用",
        Msg::Delete => "删除",
        Msg::Cancel => "取消",
        Msg::Confirm => "确定",
        Msg::ConfirmDelete => "确定要删除这个路由吗？",
        Msg::InvalidForm => "表单无效",
        Msg::RouteCreated => "路由创建成功",
        Msg::CreateFailed => "创建路由失败",
        Msg::FetchRouteFailed => "获取路由详情失败",
        Msg::RouteUpdated => "路由更新成功",
        Msg::UpdateFailed => "更新路由失败",
        Msg::RouteActivated => "路由已激活",
        Msg::RouteDeactivated => "路由已停用",
        Msg::OperationFailed => "操作失败",
        Msg::RouteDeleted => "路由删除成功",
        Msg::DeleteFailed => "删除路由失败",
        Msg::BatchCompleted => "批量操作成功",
        Msg::BatchFailed => "批量操作失败",
        Msg::HealthFailed => "获取健康状态失败",
        Msg::Status => "状态",
        Msg::Database => "数据库",
        Msg::TotalRoutes => "总路由数",
        Msg::ActiveRoutes => "激活路由",
        Msg::InactiveRoutes => "停用路由",
        Msg::LastChecked => "最后检查",
        Msg::Path => "路径",
        Msg::Methods => "HTTP方法",
        Msg::StatusCode => "状态码",
        Msg::Delay => "响应延迟(秒)",
        Msg::Description => "描述",
        Msg::Headers => "响应头(JSON)",
        Msg::ResponseBody => "响应体(JSON)",
        Msg::IsActive => "激活状态",
        Msg::CreateRoute => "创建路由",
        Msg::UpdateRoute => "更新路由",
        Msg::ActiveOnly => "仅显示激活",
        Msg::Search => "搜索",
        Msg::PerPage => "每页",
        Msg::Previous => "上一页",
        Msg::Next => "下一页",
        Msg::Page => "页码",
        Msg::Total => "共",
        Msg::Apply => "应用",
    }
}
