//! Route Group - 挂载在公共前缀下的一组路由
//!
//! 路由组是不透明的外部协作者：核心只保证按前缀正确分发到组内路由

use super::path::join_paths;
use super::{RegistryBuilder, RouteSpec};
use crate::application::error::RegistryError;

/// 路由组
pub trait RouteGroup: Send + Sync {
    /// 组名，同时作为挂载路径的最后一段
    fn name(&self) -> &'static str;

    /// 向作用域注册本组路由，模板相对于组前缀
    fn register(&self, scope: &mut GroupScope<'_>) -> Result<(), RegistryError>;
}

/// 组作用域，为注册的每条路由加上组前缀
pub struct GroupScope<'a> {
    builder: &'a mut RegistryBuilder,
    prefix: String,
    name: &'static str,
}

impl<'a> GroupScope<'a> {
    pub(super) fn new(builder: &'a mut RegistryBuilder, prefix: String, name: &'static str) -> Self {
        Self {
            builder,
            prefix,
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn add(&mut self, mut spec: RouteSpec) -> Result<(), RegistryError> {
        spec.template = join_paths(&self.prefix, &spec.template);
        spec.group = Some(self.name);
        self.builder.add(spec)
    }
}
