use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::stream::FtpStream;
use crate::core_network::{pasv, port};
use crate::server::FtpServer;
use crate::session::Session;

/// Whether the control loop keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Routes one parsed command to its handler. Handlers translate their own
/// failures into numeric replies; an `Err` here means the control transport
/// itself broke and the session must end.
pub async fn dispatch(
    command: FtpCommand,
    writer: &Arc<Mutex<FtpStream>>,
    server: &Arc<FtpServer>,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<Flow, std::io::Error> {
    use crate::core_ftpcommand as cmd;

    let writer = Arc::clone(writer);
    let server = Arc::clone(server);
    let session = Arc::clone(session);

    match command {
        FtpCommand::AUTH => cmd::auth::handle_auth_command(writer, server, session, arg).await?,
        FtpCommand::USER => {
            return cmd::user::handle_user_command(writer, server, session, arg).await;
        }
        FtpCommand::PASS => {
            return cmd::pass::handle_pass_command(writer, server, session, arg).await;
        }
        FtpCommand::SYST => cmd::syst::handle_syst_command(writer).await?,
        FtpCommand::FEAT => cmd::feat::handle_feat_command(writer, server).await?,
        FtpCommand::OPTS => cmd::opts::handle_opts_command(writer, arg).await?,
        FtpCommand::HELP => cmd::help::handle_help_command(writer).await?,
        FtpCommand::NOOP => cmd::noop::handle_noop_command(writer).await?,
        FtpCommand::QUIT => {
            cmd::quit::handle_quit_command(writer).await?;
            return Ok(Flow::Quit);
        }
        FtpCommand::PWD => cmd::pwd::handle_pwd_command(writer, session).await?,
        FtpCommand::CWD => cmd::cwd::handle_cwd_command(writer, server, session, arg).await?,
        FtpCommand::CDUP => cmd::cdup::handle_cdup_command(writer, server, session).await?,
        FtpCommand::REST => cmd::rest::handle_rest_command(writer, arg).await?,
        FtpCommand::TYPE => cmd::type_::handle_type_command(writer, session, arg).await?,
        FtpCommand::MODE => cmd::mode::handle_mode_command(writer, arg).await?,
        FtpCommand::STRU => cmd::stru::handle_stru_command(writer, arg).await?,
        FtpCommand::PBSZ => cmd::pbsz::handle_pbsz_command(writer, arg).await?,
        FtpCommand::PROT => cmd::prot::handle_prot_command(writer, session, arg).await?,
        FtpCommand::PASV => pasv::handle_pasv_command(writer, server, session, arg).await?,
        FtpCommand::EPSV => pasv::handle_epsv_command(writer, server, session, arg).await?,
        FtpCommand::PORT => port::handle_port_command(writer, server, session, arg).await?,
        FtpCommand::EPRT => port::handle_eprt_command(writer, server, session, arg).await?,
        FtpCommand::ABOR => cmd::abor::handle_abor_command(writer, session).await?,
        FtpCommand::MLSD => cmd::mlsd::handle_mlsd_command(writer, server, session).await?,
        FtpCommand::MLST => cmd::mlst::handle_mlst_command(writer, server, session, arg).await?,
        FtpCommand::STAT => cmd::stat::handle_stat_command(writer, server, session, arg).await?,
        FtpCommand::SIZE => cmd::size::handle_size_command(writer, server, session, arg).await?,
        FtpCommand::STOR => {
            cmd::stor::handle_stor_command(writer, server, session, arg, false).await?
        }
        FtpCommand::APPE => {
            cmd::stor::handle_stor_command(writer, server, session, arg, true).await?
        }
        FtpCommand::MDTM => cmd::mdtm::handle_mdtm_command(writer, server, session, arg).await?,
        FtpCommand::RETR => cmd::retr::handle_retr_command(writer, server, session, arg).await?,
        FtpCommand::DELE => cmd::dele::handle_dele_command(writer, server, session, arg).await?,
        FtpCommand::MKD => cmd::mkd::handle_mkd_command(writer, server, session, arg).await?,
        FtpCommand::RMD => cmd::rmd::handle_rmd_command(writer, server, session, arg).await?,
        FtpCommand::RNFR => cmd::rnfr::handle_rnfr_command(writer, server, session, arg).await?,
        FtpCommand::RNTO => cmd::rnto::handle_rnto_command(writer, server, session, arg).await?,
    }

    Ok(Flow::Continue)
}
