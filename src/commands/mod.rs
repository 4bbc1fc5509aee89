pub type CmdResult<T> = nsfix::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub json: bool,
}

pub mod fix;
