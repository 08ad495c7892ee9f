//! Dice wagering contract ABI.

use alloy_sol_types::sol;

sol! {
    #[sol(all_derives)]
    interface IDice {
        struct Game {
            uint256 id;
            address player1;
            address player2;
            uint256 betAmount;
            uint256 creationTime;
            uint256 timeout;
            address currentTurn;
            bool ended;
        }

        #[derive(Debug, PartialEq, Eq)]

        event GameCreated(uint256 id, address creator, uint256 betAmount, uint256 timestamp);
        #[derive(Debug, PartialEq, Eq)]
        event GameStarted(uint256 id, address player1, address player2, uint256 betAmount, uint256 timestamp, uint256 timeout);
        #[derive(Debug, PartialEq, Eq)]
        event Rolled(uint256 id, address player, uint256 roll, uint256 timestamp);
        #[derive(Debug, PartialEq, Eq)]
        event GameEnded(uint256 id, address winner, uint256 prize, uint256 timestamp, uint256 gameTimeout);
        #[derive(Debug, PartialEq, Eq)]
        event GameRestarted(uint256 id, address player1, address player2, uint256 betAmount, uint256 timestamp, uint256 newTimeout);

        function createGame(uint256 bet) external;
        function joinGame(uint256 id) external;
        function play(uint256 id) external;
        function timeout(uint256 id) external;

        function tokenContract() external view returns (address);
        function getGame(uint256 id) external view returns (Game memory);
        function getGames() external view returns (Game[] memory);
    }
}
