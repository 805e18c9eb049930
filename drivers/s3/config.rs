//! S3驱动配置

/// 进程级S3选项（凭证来自首个请求，其余来自配置文件）
#[derive(Debug, Clone)]
pub struct S3Options {
    /// S3端点地址，留空时使用 https://s3.{region}.amazonaws.com
    /// MinIO: http://localhost:9000
    pub endpoint: String,
    /// 强制使用路径风格（而非虚拟主机风格）
    /// MinIO等需要设置为true
    pub force_path_style: bool,
    /// 同时进行的传输上限
    pub max_connections: usize,
}

impl Default for S3Options {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            force_path_style: false,
            max_connections: 5000,
        }
    }
}

impl S3Options {
    /// 解析区域对应的端点
    pub fn endpoint_for(&self, region: &str, secure: bool) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.trim_end_matches('/').to_string();
        }
        let scheme = if secure { "https" } else { "http" };
        format!("{}://s3.{}.amazonaws.com", scheme, region)
    }

    /// 覆盖端点为明文HTTP而客户端要求TLS时返回true
    pub fn downgrades_tls(&self, secure: bool) -> bool {
        secure && !self.endpoint.is_empty() && !self.endpoint.trim_start().to_ascii_lowercase().starts_with("https://")
    }
}
