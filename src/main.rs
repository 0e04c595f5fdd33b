use tprobe::error::AppResult;

fn main() -> AppResult<()> {
    tprobe::entry::run()
}
